//! Macros that generate visitor traits.
//!
//! Each `visit` entry generates a free walker function `visit_<type>` (or `visit_<type>_mut`)
//! holding the default traversal, and a trait method of the same name that defaults to it.
//! Implementors override the methods they care about and call the free function to keep
//! walking.

#[doc(hidden)]
pub use paste;

/// Creates a mut visitor
#[macro_export]
macro_rules! visit_mut {
    (
        $trait_vis:vis trait $id:ident {
            $($vis:vis visit ($visitor_id:ident, $visited_id:ident: &mut $visited:ident) -> Result<()> $block:block)+
        }
    ) => {
        $(
        $crate::paste::paste! {
            $vis fn [<visit_ $visited:snake _mut>]<V: $id + ?Sized>($visitor_id: &mut V, $visited_id: &mut $visited) -> std::result::Result<(), V::Err> {
                $block
            }
        }
        )*

        $trait_vis trait $id {
            type Err;

            $(
            $crate::paste::paste! {
                fn [<visit_ $visited:snake _mut>](&mut self, $visited_id: &mut $visited) -> std::result::Result<(), Self::Err> {
                    [<visit_ $visited:snake _mut>](self, $visited_id)
                }
            }
            )*
        }
    };
}

/// Creates a visitor
#[macro_export]
macro_rules! visit {
    (
        $trait_vis:vis trait $id:ident {
            $($vis:vis visit ($visitor_id:ident, $visited_id:ident: &$visited:ident) -> Result<()> $block:block)+
        }
    ) => {
        $(
        $crate::paste::paste! {
            $vis fn [<visit_ $visited:snake>]<V: $id + ?Sized>($visitor_id: &mut V, $visited_id: &$visited) -> std::result::Result<(), V::Err> {
                $block
            }
        }
        )*

        $trait_vis trait $id {
            type Err;

            $(
            $crate::paste::paste! {
                fn [<visit_ $visited:snake>](&mut self, $visited_id: &$visited) -> std::result::Result<(), Self::Err> {
                    [<visit_ $visited:snake>](self, $visited_id)
                }
            }
            )*
        }
    };
}
