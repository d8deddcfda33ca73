//! Join clauses.

use smallvec::SmallVec;

use crate::alias::{AliasScope, AliasTable};
use crate::error::{JoinError, Result};
use crate::metadata::{EntityType, MetadataProvider};
use crate::predicate::PredicateNode;
use crate::sql::{SqlWriter, Token};

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    #[default]
    Left,
    Right,
    Inner,
}

impl JoinKind {
    pub const fn token(&self) -> Token {
        match self {
            JoinKind::Left => Token::LEFT_JOIN,
            JoinKind::Right => Token::RIGHT_JOIN,
            JoinKind::Inner => Token::INNER_JOIN,
        }
    }
}

/// One `... JOIN table alias ON ...` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub entity: EntityType,
    /// Alias slot assigned to this join
    pub slot: usize,
    pub on: PredicateNode,
    /// Unqualified references to `entity` inside `on` read from `slot`
    pub pinned: bool,
}

impl JoinClause {
    pub(crate) fn render(
        &self,
        w: &mut SqlWriter,
        aliases: &AliasTable,
        metadata: &dyn MetadataProvider,
    ) -> Result<()> {
        let table = metadata.table_name(self.entity)?;
        w.token(self.kind.token())
            .raw(table)
            .raw(&aliases.alias(self.slot))
            .token(Token::ON);
        let scope = if self.pinned {
            AliasScope::pinned(aliases, self.entity, self.slot)
        } else {
            AliasScope::new(aliases)
        };
        self.on.render(w, &scope)
    }
}

/// Verifies that `on`, the ON clause of `joined` at `slot`, only references
/// `joined` itself or tables already introduced.
///
/// A reference with an explicit slot must name `slot` or an earlier slot that
/// holds its entity.
pub(crate) fn check_references(
    on: &PredicateNode,
    joined: EntityType,
    slot: usize,
    aliases: &AliasTable,
) -> Result<()> {
    let mut referenced: SmallVec<[(EntityType, Option<usize>); 4]> = SmallVec::new();
    on.references(&mut referenced);

    let reachable = |entity: EntityType, at: Option<usize>| match at {
        Some(at) if at == slot => entity == joined,
        Some(at) => at < slot && aliases.entity(at) == Some(entity),
        None => entity == joined || aliases.contains(entity),
    };

    match referenced
        .into_iter()
        .find(|(entity, at)| !reachable(*entity, *at))
    {
        Some((entity, _)) => Err(JoinError::ForwardReference {
            joined: joined.name(),
            referenced: entity.name(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{AccessorCache, Field, Resolver};
    use crate::dialect::Dialect;
    use crate::metadata::{ColumnInfo, Entity, Registry};
    use crate::predicate::Condition;

    struct Team;
    struct Player;
    struct Coach;

    impl Entity for Team {
        const TABLE: &'static str = "team";
        const COLUMNS: &'static [ColumnInfo] = &[ColumnInfo::new("id", "id", "i64").primary_key()];
    }

    impl Entity for Player {
        const TABLE: &'static str = "player";
        const COLUMNS: &'static [ColumnInfo] = &[
            ColumnInfo::new("id", "id", "i64").primary_key(),
            ColumnInfo::new("team_id", "team_id", "i64"),
        ];
    }

    impl Entity for Coach {
        const TABLE: &'static str = "coach";
        const COLUMNS: &'static [ColumnInfo] = &[
            ColumnInfo::new("id", "id", "i64").primary_key(),
            ColumnInfo::new("team_id", "team_id", "i64"),
        ];
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register::<Team>().unwrap();
        registry.register::<Player>().unwrap();
        registry.register::<Coach>().unwrap();
        registry
    }

    #[test]
    fn test_render_pins_joined_alias() {
        let registry = registry();
        let cache = AccessorCache::new();
        let mut c = Condition::new(Resolver::new(&registry, &cache));
        c.eq(Field::<Player, i64>::new("team_id"), Field::<Team, i64>::new("id"))
            .unwrap();

        let mut aliases = AliasTable::new("t", EntityType::of::<Team>());
        aliases.push(EntityType::of::<Player>());
        let slot = aliases.push(EntityType::of::<Player>());
        let clause = JoinClause {
            kind: JoinKind::Inner,
            entity: EntityType::of::<Player>(),
            slot,
            on: c.into_node().unwrap(),
            pinned: true,
        };

        let mut w = SqlWriter::new(Dialect::Ansi);
        clause.render(&mut w, &aliases, &registry).unwrap();
        assert_eq!(w.sql(), "INNER JOIN player t2 ON t2.team_id = t.id");
    }

    #[test]
    fn test_unpinned_self_join_reads_both_slots() {
        let registry = registry();
        let cache = AccessorCache::new();
        let mut c = Condition::new(Resolver::new(&registry, &cache));
        c.eq(Field::<Team, i64>::new("id").at(1), Field::<Team, i64>::new("id"))
            .unwrap();
        let on = c.into_node().unwrap();

        let mut aliases = AliasTable::new("t", EntityType::of::<Team>());
        check_references(&on, EntityType::of::<Team>(), 1, &aliases).unwrap();
        let slot = aliases.push(EntityType::of::<Team>());

        let clause = JoinClause {
            kind: JoinKind::Left,
            entity: EntityType::of::<Team>(),
            slot,
            on,
            pinned: false,
        };
        let mut w = SqlWriter::new(Dialect::Ansi);
        clause.render(&mut w, &aliases, &registry).unwrap();
        assert_eq!(w.sql(), "LEFT JOIN team t1 ON t1.id = t.id");
    }

    #[test]
    fn test_forward_reference() {
        let registry = registry();
        let cache = AccessorCache::new();
        let mut c = Condition::new(Resolver::new(&registry, &cache));
        c.eq(Field::<Player, i64>::new("team_id"), Field::<Coach, i64>::new("team_id"))
            .unwrap();
        let on = c.into_node().unwrap();

        let aliases = AliasTable::new("t", EntityType::of::<Team>());
        let err = check_references(&on, EntityType::of::<Player>(), 1, &aliases).unwrap_err();
        assert!(matches!(err, JoinError::ForwardReference { .. }));

        let mut aliases = aliases;
        aliases.push(EntityType::of::<Coach>());
        assert!(check_references(&on, EntityType::of::<Player>(), 2, &aliases).is_ok());
    }

    #[test]
    fn test_explicit_slots_must_exist() {
        let registry = registry();
        let cache = AccessorCache::new();
        let aliases = AliasTable::new("t", EntityType::of::<Team>());
        let player = EntityType::of::<Player>();

        let on = |left: Field<Player, i64>, right: Field<Team, i64>| {
            let mut c = Condition::new(Resolver::new(&registry, &cache));
            c.eq(left, right).unwrap();
            c.into_node().unwrap()
        };
        let team_id = Field::<Player, i64>::new("team_id");
        let id = Field::<Team, i64>::new("id");

        assert!(check_references(&on(team_id.at(1), id.at(0)), player, 1, &aliases).is_ok());
        // slot 2 is not introduced yet
        assert!(check_references(&on(team_id.at(2), id), player, 1, &aliases).is_err());
        // slot 0 holds Team, not Player
        assert!(check_references(&on(team_id.at(0), id), player, 1, &aliases).is_err());
    }
}
