pub mod error;
pub mod id_pool;
pub mod id_ref;

mod free_range;

pub use error::*;
pub use id_pool::*;
pub use id_ref::*;

use static_assertions::const_assert;

/// Window identifier as understood by the toolkit (a C `int`).
pub type WindowId = i32;

/// Carried by handles that wrap no reservation.
pub const ID_NONE: WindowId = -1;

/// Lowest ID handed out by a pool built from [`IdPoolDesc::default`].
pub const ID_AUTO_LOWEST: WindowId = -32000;
/// Highest ID handed out by a pool built from [`IdPoolDesc::default`].
pub const ID_AUTO_HIGHEST: WindowId = -2000;

const_assert!(ID_AUTO_LOWEST <= ID_AUTO_HIGHEST);
const_assert!(ID_NONE < ID_AUTO_LOWEST || ID_NONE > ID_AUTO_HIGHEST);
