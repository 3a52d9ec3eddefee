// This macro generates a struct which exposes a u32 API. Grammars for names are tiny, so a wider
// storage type would buy nothing.

macro_rules! IdxNewtype {
    ($(#[$attr:meta])* $n: ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $n(pub u32);

        impl From<$n> for usize {
            fn from(st: $n) -> Self {
                st.0 as usize
            }
        }

        impl From<usize> for $n {
            fn from(st: usize) -> Self {
                debug_assert!(st <= u32::MAX as usize);
                $n(st as u32)
            }
        }
    }
}

IdxNewtype!(
    /// A type specifically for terminal indices.
    ///
    /// It is guaranteed that `TIdx` can be converted, without loss of precision, to `usize` with
    /// the idiom `usize::from(x_tidx)`.
    TIdx);
IdxNewtype!(
    /// A type specifically for nonterminal indices.
    NIdx);
IdxNewtype!(
    /// A type specifically for rule indices.
    RIdx);
