/// Implements arithmetic operator traits for single-field newtypes by delegating to the wrapped value.
#[macro_export]
macro_rules! op {
    (binary $for_struct:ident, $impl_trait:ident, $impl_fn:ident) => {
        impl $impl_trait for $for_struct {
            type Output = Self;

            fn $impl_fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$impl_fn(rhs.0))
            }
        }
    };

    (inplace $for_struct:ident, $impl_trait:ident, $impl_fn:ident) => {
        impl $impl_trait for $for_struct {
            fn $impl_fn(&mut self, rhs: Self) {
                self.0.$impl_fn(rhs.0)
            }
        }
    };

    (scalar $for_struct:ident, $impl_trait:ident, $impl_fn:ident, $rhs:ty) => {
        impl $impl_trait<$rhs> for $for_struct {
            type Output = Self;

            fn $impl_fn(self, rhs: $rhs) -> Self::Output {
                Self(self.0.$impl_fn(f64::from(rhs)))
            }
        }
    };
}
