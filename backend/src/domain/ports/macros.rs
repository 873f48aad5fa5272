//! Port error enums.
//!
//! Every driven-port failure carries exactly one field: a driver message, a
//! post id, or the conflicting value. `define_port_error!` expands each
//! variant into a `thiserror` arm plus a snake_case constructor taking
//! `impl Into<Field>`, so adapters write `PostRepositoryError::query(err.to_string())`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$doc:meta])*
                $variant:ident { $field:ident : $ty:ty } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$doc])*
                #[error($message)]
                $variant { $field: $ty },
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    pub fn [<$variant:snake>]($field: impl Into<$ty>) -> Self {
                        Self::$variant { $field: $field.into() }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;
