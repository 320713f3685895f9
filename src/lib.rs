//! Ordered containers backed by a self-balancing (AVL) search tree.
//!
//! The core type is [`SearchTree`], a height-balanced binary search tree
//! ordered by an injected [`Comparator`]. It keeps its keys unique under the
//! comparator, answers minimum/maximum queries in logarithmic time and
//! exposes lazy pre-order, in-order and post-order traversals whose state
//! lives on an explicit stack instead of the native call stack.
//!
//! Two adapters are built on top of it: [`AvlTreeMap`], an ordered map, and
//! [`AvlTreeSet`], an ordered set.
//!
//! ```
//! use avl_search::SearchTree;
//!
//! let mut tree = SearchTree::new();
//! for key in [8, 5, 7, 1, 9, 6] {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.minimum(), Ok(&1));
//! assert_eq!(tree.maximum(), Ok(&9));
//! assert_eq!(
//!     tree.in_order().copied().collect::<Vec<_>>(),
//!     vec![1, 5, 6, 7, 8, 9]
//! );
//! ```

pub mod map;
pub mod set;
pub mod tree;

mod error;

pub use error::Error;
pub use map::{AvlTreeMap, Entry};
pub use set::AvlTreeSet;
pub use tree::{Comparator, NaturalOrder, SearchTree};
