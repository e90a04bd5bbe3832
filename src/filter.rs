//! Inventory filtering: the row of category buttons above the grid and the
//! free-text search box, and how the two combine.

use std::collections::BTreeSet;

use log;

use crate::items::{ItemInstance, ItemType};

/// One filter button. `predicate` decides whether an item belongs to the
/// button's category.
#[derive(Clone, Copy)]
pub struct FilterButton {
    pub name: &'static str,
    predicate: fn(&ItemInstance) -> bool,
}

impl FilterButton {
    pub fn matches(&self, item: &ItemInstance) -> bool {
        (self.predicate)(item)
    }
}

fn has_item_type(item: &ItemInstance, item_type: ItemType) -> bool {
    item.def.as_ref().map(|def| def.item_type == item_type).unwrap_or(false)
}

fn is_weapon(item: &ItemInstance) -> bool {
    has_item_type(item, ItemType::Weapon)
}

fn is_armor(item: &ItemInstance) -> bool {
    has_item_type(item, ItemType::Armor)
}

fn is_ammo(item: &ItemInstance) -> bool {
    has_item_type(item, ItemType::Ammo)
}

fn is_consumable(item: &ItemInstance) -> bool {
    has_item_type(item, ItemType::Consumable)
}

fn is_deployable(item: &ItemInstance) -> bool {
    has_item_type(item, ItemType::Deployable)
}

fn is_block(item: &ItemInstance) -> bool {
    has_item_type(item, ItemType::Block)
}

fn is_crafting_material(item: &ItemInstance) -> bool {
    item.is_crafting_item()
}

fn is_container_item(item: &ItemInstance) -> bool {
    item.is_container()
}

fn is_equippable(item: &ItemInstance) -> bool {
    item.def.as_ref().map(|def| !def.gear_slot_sets.is_empty()).unwrap_or(false)
}

static INVENTORY_FILTER_BUTTONS: [FilterButton; 9] = [
    FilterButton { name: "Weapons", predicate: is_weapon },
    FilterButton { name: "Armor", predicate: is_armor },
    FilterButton { name: "Ammo", predicate: is_ammo },
    FilterButton { name: "Consumables", predicate: is_consumable },
    FilterButton { name: "Deployables", predicate: is_deployable },
    FilterButton { name: "Building Blocks", predicate: is_block },
    FilterButton { name: "Crafting", predicate: is_crafting_material },
    FilterButton { name: "Containers", predicate: is_container_item },
    FilterButton { name: "Equippable", predicate: is_equippable },
];

pub fn inventory_filter_buttons() -> &'static [FilterButton] {
    &INVENTORY_FILTER_BUTTONS
}

pub fn filter_button(name: &str) -> Option<&'static FilterButton> {
    INVENTORY_FILTER_BUTTONS.iter().find(|button| button.name.eq_ignore_ascii_case(name))
}

/// The set of buttons the player has toggled on. Names are validated against
/// the registry when toggled, so the set only ever holds real buttons.
#[derive(Clone, Debug, Default)]
pub struct ActiveFilters {
    names: BTreeSet<String>,
}

impl ActiveFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Flips one button. Returns whether the button is active afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        let Some(button) = filter_button(name) else {
            log::warn!("[Filter] Unknown filter button {:?}", name);
            return false;
        };
        if self.names.remove(button.name) {
            false
        } else {
            self.names.insert(button.name.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    fn buttons(&self) -> impl Iterator<Item = &'static FilterButton> + '_ {
        self.names.iter().filter_map(|name| filter_button(name))
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn has_filter_text(search: &str) -> bool {
    !search.trim().is_empty()
}

/// Case and whitespace insensitive "does the search term appear in the name".
pub fn does_search_include(search: &str, name: &str) -> bool {
    normalize(name).contains(&normalize(search))
}

/// Whether a named inventory section survives the search box. Matches in both
/// directions so searching "armor" keeps the "Heavy Armor" section and
/// searching "heavy armor boots" still keeps it too.
pub fn search_includes_section(search: &str, section_title: &str) -> bool {
    if section_title.is_empty() {
        return false;
    }
    let needle = normalize(search);
    let title = normalize(section_title);
    title.contains(&needle) || needle.contains(&title)
}

/// Combines the button row and the search box: with both in play an item has
/// to pass both, with one in play it has to pass that one, with neither
/// everything shows.
pub fn should_show_item(item: &ItemInstance, active: &ActiveFilters, search: &str) -> bool {
    let has_buttons = !active.is_empty();
    let has_search = has_filter_text(search);

    let buttons_include = active.buttons().any(|button| button.matches(item));
    let search_includes =
        does_search_include(search, item.definition_name().unwrap_or_default());

    match (has_buttons, has_search) {
        (true, true) => buttons_include && search_includes,
        (true, false) => buttons_include,
        (false, true) => search_includes,
        (false, false) => true,
    }
}
