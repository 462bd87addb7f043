//! §8.4 scenario 5: dead walkers only clone from alive companions.

use fractal_swarm::table::{Schema, StateTable, WalkerRecord};

#[test]
fn dead_walkers_clone_from_alive_companions_only() {
    let seed = WalkerRecord {
        state: 0i64,
        observ: vec![0.0],
        action: 0i64,
        dt: 1,
        reward: 0.0,
        cum_reward: 0.0,
        oob: false,
        terminal: false,
        extra: Default::default(),
    };
    let mut table = StateTable::import_walker(&seed, 4, Schema::new());
    table.states = vec![10, 11, 12, 13];
    table.oobs = vec![true, false, true, false];

    // walkers 0 and 2 are dead and must clone; 1 and 3 are alive and forced
    // not to clone (clone_probs=0 in the scenario description)
    let will_clone = vec![true, false, true, false];
    let compas = vec![1, 1, 3, 3];
    table.gather_clone(&will_clone, &compas);

    assert_eq!(table.states, vec![11, 11, 13, 13]);
    assert!(table.alive_mask[0] && table.alive_mask[2], "cloning from an alive companion revives the dead walker");
}
