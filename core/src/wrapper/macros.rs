#[doc(hidden)]
macro_rules! wrapper_join_impl {
    () => {
        wrapper_join_impl!(left, Left);
        wrapper_join_impl!(right, Right);
        wrapper_join_impl!(inner, Inner);
    };
    ($type:ident, $kind:ident) => {
        paste::paste! {
            #[doc = "Adds a " $type " join of `J` with an ON clause built by `build`."]
            pub fn [<$type _join>]<J, F>(&mut self, build: F) -> Result<&mut Self>
            where
                J: Entity,
                F: for<'c> FnOnce(&'c mut Condition<'m>) -> Result<&'c mut Condition<'m>>,
            {
                self.join::<J, F>(JoinKind::$kind, build)
            }

            #[doc = "Adds a " $type " join of the owner of `left` on `left = right`."]
            pub fn [<$type _join_on>]<J, T, R>(&mut self, left: Field<J, T>, right: R) -> Result<&mut Self>
            where
                J: Entity,
                R: Operand<T>,
            {
                self.join_on(JoinKind::$kind, left, right)
            }
        }
    };
}

#[doc(hidden)]
macro_rules! wrapper_func_impl {
    () => {
        wrapper_func_impl!(sum, Sum);
        wrapper_func_impl!(count, Count);
        wrapper_func_impl!(max, Max);
        wrapper_func_impl!(min, Min);
        wrapper_func_impl!(avg, Avg);
        wrapper_func_impl!(len, Len);
    };
    ($name:ident, $func:ident) => {
        paste::paste! {
            #[doc = "Selects `" $name "(column)` aliased as the property name."]
            pub fn [<select_ $name>]<E: 'static, T>(&mut self, field: Field<E, T>) -> Result<&mut Self> {
                self.select_func_default(DefaultFunc::$func, field)
            }

            #[doc = "Selects `" $name "(column)` under `alias`."]
            pub fn [<select_ $name _as>]<E: 'static, T>(
                &mut self,
                field: Field<E, T>,
                alias: impl IntoAlias,
            ) -> Result<&mut Self> {
                self.select_func(DefaultFunc::$func, field, alias)
            }
        }
    };
}

#[doc(hidden)]
macro_rules! wrapper_compare_impl {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name<E: 'static, T, V: Operand<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
                self.filter.$name(field, value)?;
                Ok(self)
            }
        )*
    };
}

#[doc(hidden)]
macro_rules! wrapper_pattern_impl {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name<E: 'static, T, V: IntoValue<T>>(&mut self, field: Field<E, T>, value: V) -> Result<&mut Self> {
                self.filter.$name(field, value)?;
                Ok(self)
            }
        )*
    };
}
