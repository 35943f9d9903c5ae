use std::collections::BTreeMap;

/// The address→byte map assembled programs and loaded object files share.
/// A `BTreeMap` keeps iteration in ascending address order, matching the
/// deterministic-emission rule writers rely on.
pub type Image = BTreeMap<u8, u8>;

/// Highest address written, or `None` for an empty image.
pub fn highest_address(image: &Image) -> Option<u8> {
    image.keys().next_back().copied()
}
