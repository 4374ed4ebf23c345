//! Helper macro for port error enums.
//!
//! `define_port_error!` derives `thiserror::Error` and generates a
//! snake_case constructor per variant whose fields accept `impl Into<T>`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $(
                    #[doc = concat!("`", stringify!($field), "` detail.")]
                    $field : $ty
                ),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Missing { entity: String } => "{entity} missing",
            Throttled { retry_after: u32 } => "retry after {retry_after}s",
            Rejected { reason: String, status: u16 } => "rejected ({status}): {reason}",
            Closed => "closed",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        assert_eq!(SamplePortError::missing("post").to_string(), "post missing");
    }

    #[test]
    fn typed_fields_keep_their_type() {
        assert_eq!(
            SamplePortError::throttled(30_u32),
            SamplePortError::Throttled { retry_after: 30 }
        );
    }

    #[test]
    fn mixed_and_unit_variants() {
        assert_eq!(
            SamplePortError::rejected("quota", 429_u16).to_string(),
            "rejected (429): quota"
        );
        assert_eq!(SamplePortError::closed().to_string(), "closed");
    }
}
