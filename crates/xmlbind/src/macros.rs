/// Declares an enumeration bound by member name.
///
/// The variant names are the accepted texts, matched case-sensitively. Text
/// matching no member leaves the field untouched.
///
/// ```
/// use helios_xmlbind::{XmlEnum, xml_enum};
///
/// xml_enum! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub enum Status {
///         Active,
///         Retired,
///     }
/// }
///
/// assert_eq!(Status::from_name("Retired"), Some(Status::Retired));
/// assert_eq!(Status::from_name("retired"), None);
/// ```
#[macro_export]
macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $crate::XmlEnum for $name {
            const MEMBERS: &'static [(&'static str, Self)] = &[
                $((stringify!($variant), $name::$variant),)*
            ];
        }

        impl $crate::XmlBind for $name {
            fn mapper(
                _resolver: &mut $crate::Resolver<'_>,
            ) -> ::core::result::Result<$crate::Mapper, $crate::SchemaError> {
                ::core::result::Result::Ok($crate::Mapper::enumeration::<$name>())
            }
        }
    };
}
