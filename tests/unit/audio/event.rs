use super::*;

#[test]
fn symbols_roundtrip_through_parser() {
    for v in Viseme::ALL {
        assert_eq!(Viseme::from_symbol(&v.to_string()), Some(v));
    }
    assert_eq!(Viseme::from_symbol(" D "), Some(Viseme::D));
    assert_eq!(Viseme::from_symbol("Q"), None);
    assert_eq!(Viseme::from_symbol(""), None);
}

#[test]
fn energy_follows_articulation_class() {
    assert_eq!(Viseme::X.energy(), 0.0);
    assert_eq!(Viseme::A.energy(), 0.0);
    assert_eq!(Viseme::B.energy(), 0.5);
    assert_eq!(Viseme::G.energy(), 0.5);
    assert_eq!(Viseme::D.energy(), 1.0);
    assert_eq!(Viseme::H.energy(), 1.0);
}

#[test]
fn shape_classes_match_their_docs() {
    use Articulation::*;
    let table = [
        (Viseme::A, Closed, false),
        (Viseme::B, Narrow, false),
        (Viseme::C, Open, true),
        (Viseme::D, Open, true),
        (Viseme::E, Open, true),
        (Viseme::F, Narrow, false),
        (Viseme::G, Narrow, false),
        (Viseme::H, Open, true),
        (Viseme::X, Closed, false),
    ];
    for (v, class, wide) in table {
        assert_eq!(v.articulation(), class, "{v}");
        assert_eq!(v.is_wide(), wide, "{v}");
    }
}

#[test]
fn energy_buckets_are_ordered() {
    assert_eq!(EnergyLevel::from_energy(0.0), EnergyLevel::Silent);
    assert_eq!(EnergyLevel::from_energy(0.09), EnergyLevel::Silent);
    assert_eq!(EnergyLevel::from_energy(f32::NAN), EnergyLevel::Silent);
    assert_eq!(EnergyLevel::from_energy(0.1), EnergyLevel::Small);
    assert_eq!(EnergyLevel::from_energy(0.5), EnergyLevel::Medium);
    assert_eq!(EnergyLevel::from_energy(0.65), EnergyLevel::Wide);
    assert_eq!(EnergyLevel::from_energy(1.0), EnergyLevel::Wide);
}

#[test]
fn energy_values_map_to_representative_visemes() {
    assert_eq!(EventValue::Energy(0.0).viseme(), Viseme::X);
    assert_eq!(EventValue::Energy(0.95).viseme(), Viseme::D);
    assert_eq!(EventValue::Viseme(Viseme::C).level(), EnergyLevel::Wide);
}

#[test]
fn well_formed_rejects_unsorted_and_zero_durations() {
    let ok = [
        AudioEvent::viseme(0.0, 0.1, Viseme::A),
        AudioEvent::viseme(0.1, 0.1, Viseme::B),
    ];
    assert!(is_well_formed(&ok));

    let unsorted = [ok[1], ok[0]];
    assert!(!is_well_formed(&unsorted));

    let zero = [AudioEvent::viseme(0.0, 0.0, Viseme::A)];
    assert!(!is_well_formed(&zero));
    assert!(is_well_formed(&[]));
}

#[test]
fn sort_is_stable_for_equal_starts() {
    let mut events = vec![
        AudioEvent::viseme(0.2, 0.1, Viseme::A),
        AudioEvent::viseme(0.1, 0.1, Viseme::B),
        AudioEvent::viseme(0.1, 0.1, Viseme::C),
    ];
    sort_events(&mut events);
    let order: Vec<_> = events.iter().map(|e| e.value.viseme()).collect();
    assert_eq!(order, vec![Viseme::B, Viseme::C, Viseme::A]);
}
