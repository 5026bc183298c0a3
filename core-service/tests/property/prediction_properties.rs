use std::path::Path;

use chrono::{TimeZone, Utc};
use hero_price_core::logic::dataset::SnapshotSource;
use hero_price_core::logic::explain::WaterfallLayout;
use hero_price_core::logic::features::HeroRecord;
use hero_price_core::logic::model::TreeEnsemble;
use hero_price_core::PredictionContext;
use proptest::prelude::*;

const CLASSES: &[&str] = &[
    "Archer", "DarkKnight", "Dragoon", "DreadKnight", "Knight", "Monk", "Ninja", "Paladin", "Pirate",
    "Priest", "Sage", "Summoner", "Thief", "Warrior", "Wizard",
];
const STATS: &[&str] = &["AGI", "DEX", "END", "INT", "LCK", "STR", "VIT", "WIS"];
const PROFESSIONS: &[&str] = &["fishing", "foraging", "gardening", "mining"];

fn context_for(hero: HeroRecord) -> PredictionContext {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let model = TreeEnsemble::load(&fixtures.join("model.json")).unwrap();
    PredictionContext::from_parts(model, Box::new(SnapshotSource::from_records([hero])), None).unwrap()
}

fn hero_strategy() -> impl Strategy<Value = HeroRecord> {
    (
        0u8..5,
        0u32..12,
        prop::sample::select(CLASSES),
        prop::sample::select(CLASSES),
        prop::sample::select(STATS),
        prop::sample::select(STATS),
        prop::sample::select(PROFESSIONS),
        0u32..12,
        1u32..11,
    )
        .prop_map(|(rarity, generation, main, sub, s1, s2, profession, summons, max_summons)| HeroRecord {
            id: 1,
            rarity,
            generation,
            main_class: main.to_string(),
            sub_class: sub.to_string(),
            stat_boost1: s1.to_string(),
            stat_boost2: s2.to_string(),
            profession: profession.to_string(),
            summons,
            max_summons,
        })
}

proptest! {
    #[test]
    fn attributions_add_up_to_price(hero in hero_strategy(), hour in 0u32..24) {
        let context = context_for(hero);
        let now = Utc.with_ymd_and_hms(2022, 1, 24, hour, 0, 0).unwrap();
        let prediction = context.predict_at(1, now).unwrap();

        let total = prediction.base_value
            + prediction.contributions.iter().map(|c| c.attribution).sum::<f64>();
        prop_assert!((total - prediction.price).abs() < 1e-9, "{} != {}", total, prediction.price);
    }

    #[test]
    fn waterfall_walk_ends_on_average_price(hero in hero_strategy(), cap in 1usize..15) {
        let context = context_for(hero);
        let now = Utc.with_ymd_and_hms(2022, 1, 24, 13, 0, 0).unwrap();
        let prediction = context.predict_at(1, now).unwrap();

        let layout = WaterfallLayout::new(&prediction.explanation, cap).unwrap();
        prop_assert!((layout.final_position() - context.average_price()).abs() < 1e-9);
        prop_assert_eq!(layout.aggregate().is_some(), cap < 12);
    }
}
