//! Type-directed request parameter binding: converters, the built-in
//! binders, and the startup-time handler normalizer (SPEC_FULL §4.2-4.3).

pub mod binder;
pub mod body;
pub mod converters;
pub mod normalizer;
pub mod scope;
pub mod value;

pub use binder::{Binder, CookieBinder, HeaderBinder, QueryBinder, RouteBinder};
pub use body::{BytesBinder, FormBinder, JsonBinder, MultiFormatBodyBinder, TextBinder, XmlBinder};
pub use converters::{
	BoolConverter, BytesConverter, Converter, DateConverter, DateTimeConverter, EnumConverter, FloatConverter,
	IntConverter, LiteralConverter, StringConverter, UuidConverter,
};
pub use normalizer::{HandlerSpec, HandlerSpecBuilder, ParameterOrigin, ParameterSpec};
pub use scope::{
	ClientInfoBinder, FilesBinder, IdentityBinder, RequestMethodBinder, RequestUrlBinder, ServerInfoBinder,
	ServiceBinder,
};
pub use value::{BoundValue, Scalar};
