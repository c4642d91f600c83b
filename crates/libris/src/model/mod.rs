//! Library domain: books, members and loans.

/// Enums stored as lower-case text: `Display`, `FromStr`, and `Value` conversions.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::error::LibError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err($crate::error::LibError::validation(format!(
                        "invalid {}: {other:?}",
                        stringify!($ty)
                    ))),
                }
            }
        }

        impl From<$ty> for $crate::value::Value {
            fn from(v: $ty) -> Self {
                $crate::value::Value::Text(v.as_str().to_string())
            }
        }

        impl $crate::value::FromValue for $ty {
            fn from_value(value: &$crate::value::Value) -> Result<Self, String> {
                $crate::value::parse_text(value)
            }
        }
    };
}

pub(crate) use text_enum;

mod book;
mod loan;
mod member;

pub use book::{Book, BookPatch, NewBook};
pub use loan::{Loan, LoanKind, LoanPatch, LoanPolicy, LoanStatus, NewLoan};
pub use member::{Member, MemberPatch, MemberRole, NewMember};
