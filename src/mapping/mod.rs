pub mod decode;
pub mod encode;
pub mod record;
pub mod tag;
pub mod value;

pub use decode::{decode, decode_with_time_field, TIME_COLUMN};
pub use encode::{encode, Encoded, DEFAULT_TIME_FIELD};
pub use record::{MemberSchema, Record, Role, Schema};
pub use tag::TagDescriptor;
pub use value::{FieldType, Measurement, Value, ValueKind};
