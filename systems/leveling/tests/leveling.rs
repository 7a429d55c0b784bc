use std::collections::HashSet;

use mine_crawl_core::{ChoiceKind, Command, Event};
use mine_crawl_system_leveling::{Leveling, OFFER_SIZE};
use mine_crawl_world::{self as world, query, World, WorldConfig};

fn world() -> World {
    World::new(&WorldConfig::default()).expect("world")
}

#[test]
fn catalog_offers_draw_from_both_pools() {
    let world = world();
    let pool = query::perk_choices(&world);
    assert_eq!(pool.len(), 8);

    let mut leveling = Leveling::new(12);
    let mut kinds = HashSet::new();
    for level in 2..40 {
        let mut commands = Vec::new();
        leveling.handle(&[Event::PerkChoiceNeeded { level }], &pool, &mut commands);
        let [Command::OfferPerks { choices }] = commands.as_slice() else {
            panic!("unexpected commands: {commands:?}");
        };
        assert_eq!(choices.len(), OFFER_SIZE);
        for choice in choices {
            assert!(pool.contains(choice));
            let _ = kinds.insert(choice.kind);
        }
    }
    assert!(kinds.contains(&ChoiceKind::Weapon));
    assert!(kinds.contains(&ChoiceKind::Passive));
}

#[test]
fn unrelated_events_are_ignored() {
    let world = world();
    let mut commands = Vec::new();
    Leveling::new(1).handle(
        &[Event::PlayerLeveledUp { level: 2 }],
        &query::perk_choices(&world),
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn offers_without_an_open_level_up_are_dropped() {
    let mut world = world();
    let mut events = Vec::new();
    let choices = query::perk_choices(&world);
    world::apply(&mut world, Command::OfferPerks { choices }, &mut events);
    assert!(events.is_empty());
    assert!(query::open_offer(&world).is_none());
}
