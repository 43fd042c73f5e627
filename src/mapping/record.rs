//! Record types and their member tables
//!
//! A record type is declared once with [`record!`](crate::record), which
//! emits the struct and a [`Record`] impl whose schema is resolved on first
//! use and shared afterwards.

use super::tag::TagDescriptor;
use super::value::{FieldType, Value, ValueKind};

/// How a member takes part in encode and decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Annotated `-`
    Ignored,
    /// Holds the measurement name
    Measurement,
    /// Time, tag or field, depending on its descriptor
    Value,
}

/// Resolved description of one record member
#[derive(Debug, Clone)]
pub struct MemberSchema {
    /// Rust field name
    pub member: &'static str,
    pub descriptor: TagDescriptor,
    pub kind: ValueKind,
    pub role: Role,
}

impl MemberSchema {
    /// Resolve the member `member` of type `T` with its raw annotation.
    pub fn of<T: FieldType>(member: &'static str, annotation: &str) -> Self {
        let descriptor = TagDescriptor::resolve(member, annotation);
        let role = if descriptor.is_ignored() {
            Role::Ignored
        } else if T::IS_MEASUREMENT {
            Role::Measurement
        } else {
            Role::Value
        };
        Self {
            member,
            descriptor,
            kind: T::KIND,
            role,
        }
    }

    /// External name used for columns, tags and fields
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// Members of a record type in declaration order
#[derive(Debug, Clone)]
pub struct Schema {
    members: Vec<MemberSchema>,
}

impl Schema {
    pub fn new(members: Vec<MemberSchema>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[MemberSchema] {
        &self.members
    }

    pub fn get(&self, name: &str) -> Option<&MemberSchema> {
        self.members
            .iter()
            .find(|m| m.role != Role::Ignored && m.name() == name)
    }
}

/// A struct that maps to database points and query rows.
///
/// Implement it with [`record!`](crate::record) rather than by hand.
pub trait Record: Default {
    /// Declared type name, the measurement used when nothing else is set
    fn type_name() -> &'static str;

    fn schema() -> &'static Schema;

    /// Current value of the member declared as `member`
    fn get(&self, member: &str) -> Option<Value>;

    /// Assign `value` to `member`; the value comes back if its kind does not fit.
    fn set(&mut self, member: &str, value: Value) -> Result<(), Value>;
}

/// Declare a record struct and implement [`Record`] for it.
///
/// Each member may carry one `#[influx("name[,tag][,field]")]` annotation,
/// placed after any doc comments. Doc comments and that annotation are the
/// only attributes accepted on members; attributes on the struct itself are
/// passed through. The struct must derive (or implement) `Default`.
///
/// ```
/// use chrono::{DateTime, Utc};
///
/// influxhelper::record! {
///     #[derive(Debug, Default)]
///     pub struct EnvSample {
///         /// When the sample was taken
///         #[influx("time")]
///         pub time: DateTime<Utc>,
///         #[influx("location,tag")]
///         pub location: String,
///         #[influx("temperature")]
///         pub temperature: f64,
///         #[influx("-")]
///         pub id: String,
///     }
/// }
/// ```
///
/// Other member attributes are refused:
///
/// ```compile_fail
/// influxhelper::record! {
///     #[derive(Default)]
///     struct Bad {
///         #[allow(dead_code)]
///         #[influx("value")]
///         value: f64,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (@annotation) => { "" };
    (@annotation $annotation:literal) => { $annotation };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $(#[influx($annotation:literal)])?
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::mapping::Record for $name {
            fn type_name() -> &'static str {
                stringify!($name)
            }

            fn schema() -> &'static $crate::mapping::Schema {
                static SCHEMA: ::std::sync::OnceLock<$crate::mapping::Schema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::mapping::Schema::new(vec![
                        $(
                            $crate::mapping::MemberSchema::of::<$ty>(
                                stringify!($field),
                                $crate::record!(@annotation $($annotation)?),
                            ),
                        )*
                    ])
                })
            }

            fn get(&self, member: &str) -> Option<$crate::mapping::Value> {
                match member {
                    $( stringify!($field) => Some($crate::mapping::FieldType::to_value(&self.$field)), )*
                    _ => None,
                }
            }

            fn set(
                &mut self,
                member: &str,
                value: $crate::mapping::Value,
            ) -> ::std::result::Result<(), $crate::mapping::Value> {
                match member {
                    $(
                        stringify!($field) => {
                            self.$field = <$ty as $crate::mapping::FieldType>::from_value(value)?;
                            Ok(())
                        }
                    )*
                    _ => Err(value),
                }
            }
        }
    };
    ($($unmatched:tt)*) => {
        compile_error!(
            "record! expects a struct whose members carry only doc comments and an optional #[influx(\"...\")] annotation"
        );
    };
}
