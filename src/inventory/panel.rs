use bevy::log::warn;
use bevy::prelude::*;

use crate::capabilities::InventoryUi;

const PANEL_COLOR: Color = Color::srgba(0.05, 0.05, 0.08, 0.85);
const SLOT_SIZE: f32 = 72.0;
const SLOT_GAP: f32 = 8.0;
const SLOTS_PER_ROW: f32 = 4.0;

/// Marker on the root node of the inventory panel.
#[derive(Component)]
pub struct InventoryPanel;

#[derive(Debug, Clone, Copy)]
struct SlotWidget {
    node: Entity,
    label: Entity,
}

/// Entities making up the inventory panel. Filled by [`spawn_panel`].
#[derive(Resource, Debug, Default)]
pub struct PanelWidgets {
    root: Option<Entity>,
    grid: Option<Entity>,
    slots: Vec<SlotWidget>,
}

impl PanelWidgets {
    pub fn is_spawned(&self) -> bool {
        self.root.is_some() && self.grid.is_some()
    }
}

/// [`InventoryUi`] that edits the panel through deferred commands.
pub struct PanelUi<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    widgets: &'a mut PanelWidgets,
}

impl<'a, 'w, 's> PanelUi<'a, 'w, 's> {
    /// `None` until [`spawn_panel`] has run.
    pub fn new(commands: &'a mut Commands<'w, 's>, widgets: &'a mut PanelWidgets) -> Option<Self> {
        widgets.is_spawned().then_some(Self { commands, widgets })
    }

    fn slot(&self, index: usize) -> Option<SlotWidget> {
        let slot = self.widgets.slots.get(index).copied();
        if slot.is_none() {
            warn!(target: "inventory", index, "no slot widget at index");
        }
        slot
    }
}

impl InventoryUi for PanelUi<'_, '_, '_> {
    fn set_panel_visible(&mut self, visible: bool) {
        if let Some(root) = self.widgets.root {
            let visibility = if visible { Visibility::Visible } else { Visibility::Hidden };
            self.commands.entity(root).insert(visibility);
        }
    }

    fn destroy_slots(&mut self) {
        for slot in self.widgets.slots.drain(..) {
            self.commands.entity(slot.node).despawn_recursive();
        }
    }

    fn instantiate_slot(&mut self, index: usize) {
        let Some(grid) = self.widgets.grid else { return };
        if index != self.widgets.slots.len() {
            warn!(target: "inventory", index, existing = self.widgets.slots.len(), "slots instantiated out of order");
        }

        let label = self
            .commands
            .spawn((
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::BLACK),
                Visibility::Hidden,
            ))
            .id();
        let node = self
            .commands
            .spawn((
                Node {
                    width: Val::Px(SLOT_SIZE),
                    height: Val::Px(SLOT_SIZE),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                BackgroundColor(Color::NONE),
            ))
            .add_child(label)
            .id();
        self.commands.entity(grid).add_child(node);
        self.widgets.slots.push(SlotWidget { node, label });
    }

    fn set_slot_label(&mut self, index: usize, text: &str, visible: bool) {
        let Some(slot) = self.slot(index) else { return };
        let visibility = if visible { Visibility::Inherited } else { Visibility::Hidden };
        self.commands
            .entity(slot.label)
            .insert((Text::new(text), visibility));
    }

    fn set_slot_tint(&mut self, index: usize, tint: Color) {
        let Some(slot) = self.slot(index) else { return };
        self.commands.entity(slot.node).insert(BackgroundColor(tint));
    }
}

/// Spawns the hidden panel: a title above an empty slot grid.
pub fn spawn_panel(mut commands: Commands, mut widgets: ResMut<PanelWidgets>) {
    let grid_width = SLOTS_PER_ROW * SLOT_SIZE + (SLOTS_PER_ROW - 1.0) * SLOT_GAP;

    let mut grid = None;
    let root = commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Percent(50.0),
                top: Val::Percent(20.0),
                margin: UiRect::left(Val::Px(-(grid_width / 2.0) - 16.0)),
                padding: UiRect::all(Val::Px(16.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(12.0),
                ..default()
            },
            BackgroundColor(PANEL_COLOR),
            Visibility::Hidden,
            InventoryPanel,
            Name::new("Inventory Panel"),
        ))
        .with_children(|parent: &mut ChildBuilder| {
            parent.spawn((
                Text::new("Inventory"),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
            ));
            grid = Some(
                parent
                    .spawn(Node {
                        width: Val::Px(grid_width),
                        flex_direction: FlexDirection::Row,
                        flex_wrap: FlexWrap::Wrap,
                        column_gap: Val::Px(SLOT_GAP),
                        row_gap: Val::Px(SLOT_GAP),
                        ..default()
                    })
                    .id(),
            );
        })
        .id();

    widgets.root = Some(root);
    widgets.grid = grid;
    widgets.slots.clear();
}
