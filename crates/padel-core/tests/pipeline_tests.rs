mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use padel_core::{Cell, PaDEL, PadelError};
use padel_domain::SelectionRequest;
use padel_engine::PassThroughToolkit;
use support::*;

fn external(requests: &[&str], ignore_3d: bool) -> (PaDEL, Arc<FakeEpadelRunner>) {
    let runner = Arc::new(FakeEpadelRunner::default());
    let padel = PaDEL::with_engine(requests.iter().copied(),
                                   ignore_3d,
                                   external_adapter(Arc::clone(&runner)),
                                   Arc::new(PassThroughToolkit)).expect("selecciones válidas");
    (padel, runner)
}

#[test]
fn one_row_per_molecule_for_any_chunking() {
    let (padel, _) = external(&["ALOGP", "MACCSFP"], false);
    let mols = molecules(7);
    for (njobs, chunksize) in [(1, 1), (1, 3), (2, 2), (4, 100)] {
        let table = padel.calculate(&mols, false, njobs, chunksize).expect("cálculo");
        assert_eq!(table.n_rows(), 7, "njobs={njobs} chunksize={chunksize}");
        assert_eq!(table.n_cols(), 3 + 166);
    }
}

#[test]
fn result_does_not_depend_on_njobs() {
    let (padel, _) = external(&["ALOGP", "Weight", "PubchemFP"], false);
    let mols = molecules(10);
    let sequential = padel.calculate(&mols, false, 1, 3).expect("secuencial");
    for njobs in [2, 4] {
        let parallel = padel.calculate(&mols, false, njobs, 1).expect("paralelo");
        assert_eq!(parallel, sequential, "njobs={njobs}");
    }
}

#[test]
fn empty_molecule_becomes_null_row_in_place() {
    let (padel, _) = external(&["MACCSFP"], false);
    let mols = vec![alkane(3), empty_molecule(), alkane(5)];
    let table = padel.calculate(&mols, false, 1, 100).expect("cálculo");

    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.n_cols(), 166);
    assert!(table.is_null_row(1));
    for row in [0, 2] {
        assert!(table.rows()[row].iter().all(|c| !c.is_null()), "fila {row}");
    }
    // La fila 2 corresponde a C5, no a C3.
    let expected = fake_value("MACCSFP1", 5, true);
    assert_eq!(table.get(2, "MACCSFP1").map(|c| c.to_string()), Some(expected));
}

#[test]
fn selections_do_not_interfere() {
    let mols = molecules(4);
    let (both, _) = external(&["ALOGP", "MACCSFP"], false);
    let (alogp, _) = external(&["ALOGP"], false);
    let (maccs, _) = external(&["MACCSFP"], false);

    let combined = both.calculate(&mols, false, 1, 100).expect("combinado");
    let left = alogp.calculate(&mols, false, 1, 100).expect("ALOGP");
    let right = maccs.calculate(&mols, false, 1, 100).expect("MACCSFP");

    assert_eq!(combined.column_names(),
               left.column_names().into_iter().chain(right.column_names()).collect::<Vec<_>>());
    for name in left.columns() {
        assert_eq!(combined.column(name), left.column(name));
    }
    for name in right.columns() {
        assert_eq!(combined.column(name), right.column(name));
    }
}

#[test]
fn configured_fingerprint_width_and_no_parallelism() {
    let runner = Arc::new(FakeEpadelRunner::default());
    let padel = PaDEL::with_engine([SelectionRequest::new("FP").with_size(256)],
                                   false,
                                   external_adapter(Arc::clone(&runner)),
                                   Arc::new(PassThroughToolkit)).expect("FP configurable");
    assert!(!padel.can_parallelize(4));

    let table = padel.calculate(&molecules(3), false, 4, 1).expect("cálculo");
    assert_eq!(table.n_cols(), 256);
    assert_eq!(table.columns().next(), Some("FP1"));
    assert_eq!(table.columns().last(), Some("FP256"));
    assert!(runner.commands().iter().any(|c| c.flag_value("-nBits") == Some("256")));
}

#[test]
fn repeated_calls_give_identical_tables() {
    let (padel, _) = external(&["ALOGP", "EStateFP"], false);
    let mols = molecules(5);
    let first = padel.calculate(&mols, false, 2, 2).expect("primera");
    let second = padel.calculate(&mols, false, 2, 2).expect("segunda");
    assert_eq!(first, second);
    assert_eq!(first.digest(), second.digest());
}

#[test]
fn many_workers_small_chunks_match_sequential() {
    let (padel, _) = external(&["ALOGP"], false);
    let mols = molecules(10);
    let sequential = padel.calculate(&mols, false, 1, 100).expect("secuencial");
    let parallel = padel.calculate(&mols, false, 4, 1).expect("paralelo");
    assert_eq!(parallel, sequential);
    for (i, row) in parallel.rows().iter().enumerate() {
        assert_eq!(row[0].to_string(), fake_value("ALogP", i + 1, false));
    }
}

#[test]
fn unknown_identifier_rejects_whole_list_before_engine() {
    let runner = Arc::new(FakeEpadelRunner::default());
    let err = PaDEL::with_engine(["ALOGP", "NoSuchDescriptor"],
                                 false,
                                 external_adapter(Arc::clone(&runner)),
                                 Arc::new(PassThroughToolkit)).err()
                                                              .expect("debe fallar");
    assert!(matches!(err, PadelError::InvalidSelection(_)), "{err:?}");
    assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn duplicate_selection_keeps_first() {
    let (padel, _) = external(&["MACCSFP", "ALOGP", "MACCS fingerprint"], false);
    assert_eq!(padel.selections().len(), 2);
    assert_eq!(padel.selections()[0].name(), "MACCSFP");
    let table = padel.calculate(&molecules(2), false, 1, 100).expect("cálculo");
    assert_eq!(table.n_cols(), 166 + 3);
    assert_eq!(table.columns().next(), Some("MACCSFP1"));
}

#[test]
fn parameters_on_fixed_fingerprint_are_ignored() {
    let runner = Arc::new(FakeEpadelRunner::default());
    let padel = PaDEL::with_engine([SelectionRequest::new("MACCSFP").with_size(64)],
                                   false,
                                   external_adapter(Arc::clone(&runner)),
                                   Arc::new(PassThroughToolkit)).expect("parámetros ignorados");
    assert!(padel.can_parallelize(2));
    let table = padel.calculate(&molecules(2), false, 1, 100).expect("cálculo");
    assert_eq!(table.n_cols(), 166);
    assert!(runner.commands().iter().all(|c| !c.has_flag("-nBits")));
}

#[test]
fn ignore_3d_drops_three_dimensional_groups() {
    let (padel, _) = external(&["ALOGP", "RDF"], true);
    assert_eq!(padel.selections().len(), 1);
    let table = padel.calculate(&molecules(2), false, 1, 100).expect("cálculo");
    assert_eq!(table.n_cols(), 3);
    assert!(!table.has_column("RDF10u"));
}

#[test]
fn three_d_groups_reject_flat_molecules() {
    let (padel, runner) = external(&["ALOGP", "RDF"], false);
    let mols = vec![alkane(3), water_3d()];
    let table = padel.calculate(&mols, false, 1, 100).expect("cálculo");

    assert!(table.has_column("RDF10u"));
    assert!(table.is_null_row(0));
    assert!(!table.is_null_row(1));
    assert_eq!(table.get(1, "ALogP").map(|c| c.to_string()), Some(fake_value("ALogP", 3, false)));
    assert!(runner.commands().iter().any(|c| c.has_flag("-3D")));
}

#[test]
fn non_replicable_engine_never_runs_in_parallel() {
    let padel = PaDEL::with_engine(["ALOGP"],
                                   false,
                                   in_process_adapter(MockRuntime::default()),
                                   Arc::new(PassThroughToolkit)).expect("selección");
    assert!(!padel.can_parallelize(4));
    let table = padel.calculate(&molecules(6), false, 4, 1).expect("cálculo");
    assert_eq!(table.n_rows(), 6);
}

#[test]
fn zero_njobs_or_chunksize_is_invalid_argument() {
    let (padel, runner) = external(&["ALOGP"], false);
    let mols = molecules(2);
    assert!(matches!(padel.calculate(&mols, false, 0, 10), Err(PadelError::InvalidArgument(_))));
    assert!(matches!(padel.calculate(&mols, false, 1, 0), Err(PadelError::InvalidArgument(_))));
    assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_input_gives_empty_table_with_columns() {
    let (padel, runner) = external(&["ALOGP"], false);
    let table = padel.calculate::<String>(&[], false, 2, 10).expect("cálculo");
    assert_eq!(table.n_rows(), 0);
    assert_eq!(table.column_names(), vec!["ALogP", "ALogp2", "AMR"]);
    assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn no_selections_keeps_rows() {
    let (padel, _) = external(&[], false);
    let table = padel.calculate(&molecules(3), false, 1, 10).expect("cálculo");
    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.n_cols(), 0);
}

#[test]
fn details_point_to_descriptor_documentation() {
    let (padel, _) = external(&["ALOGP"], false);
    let details = padel.details();
    assert!(details.contains("http://www.yapcwsoft.com/dd/padeldescriptor/"));
    assert!(details.contains("embedded catalog"));
}

#[test]
fn null_cells_render_empty_in_tsv() {
    let (padel, _) = external(&["ALOGP"], false);
    let table = padel.calculate(&[empty_molecule()], false, 1, 10).expect("cálculo");
    assert_eq!(table.rows()[0], vec![Cell::Null; 3]);
    assert_eq!(table.to_tsv(), "ALogP\tALogp2\tAMR\n\t\t\n");
}

#[test]
fn whim_runs_with_three_d_flag() {
    let (padel, runner) = external(&["WHIM"], false);
    let table = padel.calculate(&[water_3d()], false, 1, 100).expect("cálculo");
    assert_eq!(table.n_cols(), 91);
    assert!(!table.is_null_row(0));
    assert!(runner.commands().iter().filter(|c| c.has_flag("-d")).all(|c| c.has_flag("-3D")));
}

#[test]
fn unreadable_counts_line_is_a_null_row() {
    let (padel, _) = external(&["ALOGP"], false);
    let mols = vec![alkane(3), overflowing_counts_molecule(), alkane(4)];
    let table = padel.calculate(&mols, false, 1, 100).expect("cálculo");
    assert_eq!(table.n_rows(), 3);
    assert!(table.is_null_row(1));
    assert_eq!(table.get(2, "ALogP").map(|c| c.to_string()), Some(fake_value("ALogP", 4, false)));
}
