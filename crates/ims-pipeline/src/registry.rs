//! Typed ownership of the five pipeline slots.
//!
//! Background and Raw exist for the whole session. The derived slots
//! (Diff, Binary, Contour) come into existence together, exactly once,
//! and are never dropped afterwards.

use crate::slot::{ImageSlot, SlotName, UserSlot};

/// The three slots computed from Background and Raw.
#[derive(Debug)]
pub struct DerivedSlots {
    /// Absolute difference.
    pub diff: ImageSlot,
    /// Thresholded difference.
    pub binary: ImageSlot,
    /// Contour overlay.
    pub contour: ImageSlot,
}

impl DerivedSlots {
    fn new() -> Self {
        Self {
            diff: ImageSlot::new(SlotName::Diff),
            binary: ImageSlot::new(SlotName::Binary),
            contour: ImageSlot::new(SlotName::Contour),
        }
    }

    /// Drop all three frames, leaving each preview on its placeholder.
    pub fn clear(&mut self) {
        for slot in [&mut self.diff, &mut self.binary, &mut self.contour] {
            slot.set_frame(None);
        }
    }
}

/// Registry owning every slot, addressed by [`SlotName`].
#[derive(Debug)]
pub struct SlotRegistry {
    background: ImageSlot,
    raw: ImageSlot,
    derived: Option<DerivedSlots>,
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotRegistry {
    /// Registry with empty Background and Raw and no derived slots.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            background: ImageSlot::new(SlotName::Background),
            raw: ImageSlot::new(SlotName::Raw),
            derived: None,
        }
    }

    /// The Background slot.
    #[must_use]
    pub const fn background(&self) -> &ImageSlot {
        &self.background
    }

    /// The Raw slot.
    #[must_use]
    pub const fn raw(&self) -> &ImageSlot {
        &self.raw
    }

    /// Derived slots, once allocated.
    #[must_use]
    pub const fn derived(&self) -> Option<&DerivedSlots> {
        self.derived.as_ref()
    }

    /// Mutable derived slots, once allocated.
    pub const fn derived_mut(&mut self) -> Option<&mut DerivedSlots> {
        self.derived.as_mut()
    }

    /// Mutable access to a user slot.
    pub const fn user_mut(&mut self, slot: UserSlot) -> &mut ImageSlot {
        match slot {
            UserSlot::Background => &mut self.background,
            UserSlot::Raw => &mut self.raw,
        }
    }

    /// Both user slots at once: `(background, raw)`.
    pub const fn user_pair_mut(&mut self) -> (&mut ImageSlot, &mut ImageSlot) {
        (&mut self.background, &mut self.raw)
    }

    /// Return the derived slots, creating them on first call.
    ///
    /// The flag is `true` only on the call that created them.
    pub fn derived_or_allocate(&mut self) -> (&mut DerivedSlots, bool) {
        let created = self.derived.is_none();
        (self.derived.get_or_insert_with(DerivedSlots::new), created)
    }

    /// Look up any slot by name. Derived slots are `None` until allocated.
    #[must_use]
    pub fn get(&self, name: SlotName) -> Option<&ImageSlot> {
        match name {
            SlotName::Background => Some(&self.background),
            SlotName::Raw => Some(&self.raw),
            SlotName::Diff => self.derived.as_ref().map(|d| &d.diff),
            SlotName::Binary => self.derived.as_ref().map(|d| &d.binary),
            SlotName::Contour => self.derived.as_ref().map(|d| &d.contour),
        }
    }

    /// Mutable lookup by name.
    pub fn get_mut(&mut self, name: SlotName) -> Option<&mut ImageSlot> {
        match name {
            SlotName::Background => Some(&mut self.background),
            SlotName::Raw => Some(&mut self.raw),
            SlotName::Diff => self.derived.as_mut().map(|d| &mut d.diff),
            SlotName::Binary => self.derived.as_mut().map(|d| &mut d.binary),
            SlotName::Contour => self.derived.as_mut().map(|d| &mut d.contour),
        }
    }

    /// Every existing slot, in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = &ImageSlot> {
        SlotName::ALL.into_iter().filter_map(|name| self.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_user_slots_only() {
        let registry = SlotRegistry::new();
        assert!(registry.get(SlotName::Background).is_some());
        assert!(registry.get(SlotName::Raw).is_some());
        assert!(registry.get(SlotName::Diff).is_none());
        assert!(registry.derived().is_none());
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn derived_slots_are_allocated_once() {
        let mut registry = SlotRegistry::new();
        let (_, created) = registry.derived_or_allocate();
        assert!(created);
        let (_, created) = registry.derived_or_allocate();
        assert!(!created);

        let names: Vec<_> = registry.iter().map(ImageSlot::name).collect();
        assert_eq!(names, SlotName::ALL.to_vec());
    }

    #[test]
    fn user_mut_addresses_the_right_slot() {
        let mut registry = SlotRegistry::new();
        assert_eq!(registry.user_mut(UserSlot::Raw).name(), SlotName::Raw);
        assert_eq!(
            registry.user_mut(UserSlot::Background).name(),
            SlotName::Background
        );
    }
}
