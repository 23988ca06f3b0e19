/// Implements the standard arithmetic traits for single-field integer newtypes.
///
/// `op!(binary T, Add, add)` generates `impl Add for T`, `op!(inplace T, SubAssign, sub_assign)` the in-place
/// form, and `op!(unary T, Neg, neg)` the unary form.
#[macro_export]
macro_rules! op {
    (binary $t:ident, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $t {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $t:ident, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $t {
            fn $method(&mut self, rhs: Self) {
                std::ops::$trait::$method(&mut self.0, rhs.0);
            }
        }
    };
    (unary $t:ident, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $t {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0))
            }
        }
    };
}
