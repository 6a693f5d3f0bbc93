//! Inventory overlay: a modal panel with a fixed number of slots.
//!
//! While the overlay is open the controller stops reading movement, camera
//! and attack input; gravity keeps running.

pub mod panel;

use bevy::color::Color;
use bevy::log::{info, warn};

use crate::capabilities::{CaptureMode, InventoryUi};

pub const FILLED_SLOT_TINT: Color = Color::srgba(0.95, 0.85, 0.45, 1.0);
pub const EMPTY_SLOT_TINT: Color = Color::srgba(0.3, 0.3, 0.3, 0.35);

/// Ordered item labels. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Removes the first item with this label.
    pub fn remove(&mut self, item: &str) -> bool {
        match self.items.iter().position(|existing| existing == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// `None` for an empty slot.
    pub label: Option<String>,
}

impl Slot {
    pub fn is_filled(&self) -> bool {
        self.label.is_some()
    }

    pub fn tint(&self) -> Color {
        if self.is_filled() {
            FILLED_SLOT_TINT
        } else {
            EMPTY_SLOT_TINT
        }
    }
}

/// Always exactly `capacity` slots: the first items in order, then empties.
pub fn build_slots(items: &[String], capacity: usize) -> Vec<Slot> {
    if items.len() > capacity {
        warn!(
            target: "inventory",
            items = items.len(),
            capacity,
            "inventory holds more items than the overlay can show"
        );
    }
    (0..capacity)
        .map(|index| Slot {
            label: items.get(index).cloned(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct InventoryOverlay {
    open: bool,
    capacity: usize,
    slots: Vec<Slot>,
    inventory: Inventory,
}

impl InventoryOverlay {
    pub fn new(capacity: usize, inventory: Inventory) -> Self {
        Self {
            open: false,
            capacity,
            slots: Vec::new(),
            inventory,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots as of the last time the overlay opened.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Flips the overlay and returns the pointer mode the host should switch to.
    pub fn toggle(&mut self, ui: Option<&mut (dyn InventoryUi + '_)>) -> CaptureMode {
        self.open = !self.open;
        if self.open {
            self.slots = build_slots(self.inventory.items(), self.capacity);
        }
        info!(target: "inventory", open = self.open, items = self.inventory.len(), "overlay toggled");

        match ui {
            Some(ui) => {
                ui.set_panel_visible(self.open);
                if self.open {
                    render_slots(ui, &self.slots);
                }
            }
            None => warn!(target: "inventory", "no inventory ui attached, overlay has nothing to show"),
        }

        if self.open {
            CaptureMode::Free
        } else {
            CaptureMode::Captured
        }
    }
}

/// Replaces every slot widget. Labels of empty slots are hidden, not blanked,
/// so no earlier text can show through.
fn render_slots(ui: &mut dyn InventoryUi, slots: &[Slot]) {
    ui.destroy_slots();
    for (index, slot) in slots.iter().enumerate() {
        ui.instantiate_slot(index);
        match &slot.label {
            Some(label) => ui.set_slot_label(index, label, true),
            None => ui.set_slot_label(index, "", false),
        }
        ui.set_slot_tint(index, slot.tint());
    }
}
