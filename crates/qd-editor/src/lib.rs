pub mod arbiter;
pub mod composer;
pub mod gesture;
pub mod input;
pub mod notify;

pub use arbiter::{GestureArbiter, GestureLease};
pub use composer::{Composer, Dispatch};
pub use gesture::{ElementChange, ElementController, GestureRejected, GestureState};
pub use input::{InputEvent, PointerSource};
pub use notify::{Notice, NoticeLevel, Notices};
