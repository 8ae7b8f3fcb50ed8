//! Normalization between "one path" and "many paths" arguments.
//!
//! Pipeline nodes pass either a single file or a list of files for the same
//! input. [`IntoPathList`] turns every accepted shape into an ordered `Vec`
//! so downstream code only handles one case, and [`collapse`] goes back.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Values that can be viewed as an ordered sequence of paths.
///
/// Returns `None` for containers without a defined iteration order.
pub trait IntoPathList {
    /// Converts `self` into an ordered sequence of paths.
    fn to_sequence(self) -> Option<Vec<PathBuf>>;
}

/// Free-function form of [`IntoPathList::to_sequence`].
pub fn to_sequence<L: IntoPathList>(value: L) -> Option<Vec<PathBuf>> {
    value.to_sequence()
}

macro_rules! single_path {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoPathList for $ty {
                fn to_sequence(self) -> Option<Vec<PathBuf>> {
                    Some(vec![PathBuf::from(self)])
                }
            }
        )*
    };
}

single_path!(&str, String, &String, &Path, PathBuf, &PathBuf);

impl<T: AsRef<Path>> IntoPathList for &[T] {
    fn to_sequence(self) -> Option<Vec<PathBuf>> {
        Some(self.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}

impl<T: AsRef<Path>, const N: usize> IntoPathList for [T; N] {
    fn to_sequence(self) -> Option<Vec<PathBuf>> {
        self.as_slice().to_sequence()
    }
}

impl<T: AsRef<Path>> IntoPathList for Vec<T> {
    fn to_sequence(self) -> Option<Vec<PathBuf>> {
        self.as_slice().to_sequence()
    }
}

impl<T: AsRef<Path>> IntoPathList for &Vec<T> {
    fn to_sequence(self) -> Option<Vec<PathBuf>> {
        self.as_slice().to_sequence()
    }
}

impl<T: AsRef<Path>> IntoPathList for VecDeque<T> {
    fn to_sequence(self) -> Option<Vec<PathBuf>> {
        Some(self.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}

impl<T: AsRef<Path> + Ord> IntoPathList for BTreeSet<T> {
    fn to_sequence(self) -> Option<Vec<PathBuf>> {
        Some(self.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}

impl<T, S> IntoPathList for HashSet<T, S> {
    fn to_sequence(self) -> Option<Vec<PathBuf>> {
        None
    }
}

/// Either a single value or a sequence of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Exactly one value.
    One(T),
    /// Zero or several values.
    Many(Vec<T>),
}

/// Returns the sole element of a one-element sequence, otherwise the sequence.
///
/// Callers are expected to pass at least one element. An empty sequence is
/// returned unchanged as `Many(vec![])`.
pub fn collapse<T>(mut values: Vec<T>) -> OneOrMany<T> {
    if values.len() == 1 {
        if let Some(value) = values.pop() {
            return OneOrMany::One(value);
        }
    }
    OneOrMany::Many(values)
}
