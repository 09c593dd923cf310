//! # windowid
//!
//! Reference-counted window ID reservation.
//!
//! An [`IdPool`] hands out IDs from a bounded namespace, skipping every ID
//! that callers registered as taken (literal constants, legacy allocations,
//! third-party picks). Reserved IDs come wrapped in [`IdRef`] handles; an ID
//! goes back to the pool when the last handle referencing it is dropped.
//!
//! ## Example
//!
//! ```
//! use windowid::{IdPool, IdPoolDesc};
//!
//! let pool = IdPool::new(IdPoolDesc::default()).unwrap();
//!
//! let button = pool.new_id_refs(1).unwrap().remove(0);
//! let shared = button.clone();
//! let id = button.value();
//!
//! drop(button);
//! assert!(!pool.is_free(id));
//!
//! drop(shared);
//! assert!(pool.is_free(id));
//! ```

pub mod allocators;


pub use allocators::{
    IdError, IdPool, IdPoolDesc, IdRef, NewIdRef, WindowId, ID_AUTO_HIGHEST, ID_AUTO_LOWEST,
    ID_NONE,
};
