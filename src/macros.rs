/// Constructs render data, the named arguments of a render call.
///
/// The top level is a list of `name: value` pairs and produces a
/// [`Value::Map`][crate::Value::Map]. Values can be nested maps `{ .. }`,
/// lists `[ .. ]`, `None` or any expression with a `From` conversion into
/// [`Value`][crate::Value].
///
/// # Examples
///
/// ```
/// let data = stencil::data! {
///     user: { name: "John Smith", age: 42 },
///     tags: ["a", "b"],
///     nickname: None,
/// };
/// ```
#[macro_export]
macro_rules! data {
    () => {
        $crate::Value::Map(::std::collections::BTreeMap::new())
    };
    ($($tt:tt)+) => {
        $crate::_data!({ $($tt)+ })
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! _data {
    //////////////////////////////////////////////////////////////////////////
    // TT muncher for the inside of a list [...], accumulating the elements.
    //
    // Must be invoked as: _data!(@list [] $($tt)*)
    //////////////////////////////////////////////////////////////////////////
    (@list [$($elems:expr,)*]) => {
        ::std::vec![$($elems,)*]
    };

    (@list [$($elems:expr,)*] None $(, $($rest:tt)*)?) => {
        $crate::_data!(@list [$($elems,)* $crate::Value::None,] $($($rest)*)?)
    };

    (@list [$($elems:expr,)*] [$($list:tt)*] $(, $($rest:tt)*)?) => {
        $crate::_data!(@list [$($elems,)* $crate::_data!([$($list)*]),] $($($rest)*)?)
    };

    (@list [$($elems:expr,)*] {$($map:tt)*} $(, $($rest:tt)*)?) => {
        $crate::_data!(@list [$($elems,)* $crate::_data!({$($map)*}),] $($($rest)*)?)
    };

    (@list [$($elems:expr,)*] $next:expr $(, $($rest:tt)*)?) => {
        $crate::_data!(@list [$($elems,)* $crate::Value::from($next),] $($($rest)*)?)
    };

    //////////////////////////////////////////////////////////////////////////
    // TT muncher for the inside of a map {...}. Each entry is inserted into
    // the given map variable.
    //
    // Must be invoked as: _data!(@map $map $($tt)*)
    //////////////////////////////////////////////////////////////////////////
    (@map $map:ident) => {};

    (@map $map:ident $key:ident : None $(, $($rest:tt)*)?) => {
        $map.insert(::std::string::String::from(stringify!($key)), $crate::Value::None);
        $crate::_data!(@map $map $($($rest)*)?);
    };

    (@map $map:ident $key:ident : [$($list:tt)*] $(, $($rest:tt)*)?) => {
        $map.insert(::std::string::String::from(stringify!($key)), $crate::_data!([$($list)*]));
        $crate::_data!(@map $map $($($rest)*)?);
    };

    (@map $map:ident $key:ident : {$($inner:tt)*} $(, $($rest:tt)*)?) => {
        $map.insert(::std::string::String::from(stringify!($key)), $crate::_data!({$($inner)*}));
        $crate::_data!(@map $map $($($rest)*)?);
    };

    (@map $map:ident $key:ident : $value:expr $(, $($rest:tt)*)?) => {
        $map.insert(::std::string::String::from(stringify!($key)), $crate::Value::from($value));
        $crate::_data!(@map $map $($($rest)*)?);
    };

    //////////////////////////////////////////////////////////////////////////
    // The main implementation.
    //////////////////////////////////////////////////////////////////////////
    ([ $($tt:tt)* ]) => {
        $crate::Value::List($crate::_data!(@list [] $($tt)*))
    };

    ({ $($tt:tt)* }) => {
        $crate::Value::Map({
            #[allow(unused_mut)]
            let mut map = ::std::collections::BTreeMap::<::std::string::String, $crate::Value>::new();
            $crate::_data!(@map map $($tt)*);
            map
        })
    };
}
