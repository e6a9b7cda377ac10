//! Identifier renamer.
//!
//! Pure, ASCII-only string transforms from IDL names to Go identifiers.
//! Exported names are upper camel case, unexported ones lower camel case;
//! common initialisms are kept fully upper-cased (`user_id` -> `UserID`).

mod renamer;


pub use renamer::{
    GO_KEYWORDS, INITIALISMS, camel_merge, go_variable, helper_struct_name, new_prefix, privatize,
    publicize,
};
