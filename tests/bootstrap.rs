mod common;

use common::{Post, User, registry};
use joinwise::{EntityType, JoinConfig, JoinError, Result, install_with, runtime, wrapper};

// One test per binary: the runtime is process-wide and installs once.
#[test]
fn test_install_once() -> Result<()> {
    assert!(matches!(runtime(), Err(JoinError::Bootstrap(_))));
    assert!(matches!(wrapper::<User>(), Err(JoinError::Bootstrap(_))));

    let installed = install_with(registry(), JoinConfig::new().table_alias("q"))?;
    assert!(installed.registry().contains(EntityType::of::<User>()));
    assert_eq!(installed.config().table_alias, "q");

    assert!(matches!(
        joinwise::install(registry()),
        Err(JoinError::Bootstrap(_))
    ));

    let query = wrapper::<User>()?
        .select((User::name, Post::title))?
        .inner_join_on(Post::user_id, User::id)?
        .render()?;
    assert_eq!(
        query.sql,
        "SELECT q.name, q1.title FROM users q INNER JOIN posts q1 ON q1.user_id = q.id"
    );
    Ok(())
}
