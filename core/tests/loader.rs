use std::{fs, path::Path};

use approx::assert_relative_eq;
use matbench_core::{
    load_experiment, ExperimentFamily, GroupBy, PerformancePolicy, ResultsContext, Selection,
};
use tempfile::TempDir;

const OMP_HEADER: &str = "Exp,Matrix Size,Block Size,Op,P,Time";

fn write_csv(root: &Path, family: ExperimentFamily, file: &str, contents: &str) {
    let dir = root.join(family.folder());
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), contents).unwrap();
}

#[test]
fn concatenates_files_and_drops_run_id() {
    let root = TempDir::new().unwrap();
    write_csv(
        root.path(),
        ExperimentFamily::MmOmp,
        "run1.csv",
        &format!("{OMP_HEADER}\n1,512,128,1,1,0.5\n1,1024,128,1,1,4.0\n"),
    );
    write_csv(
        root.path(),
        ExperimentFamily::MmOmp,
        "run2.csv",
        &format!("{OMP_HEADER}\n2,512,128,1,1,0.7\n"),
    );
    write_csv(root.path(), ExperimentFamily::MmOmp, "notes.txt", "ignored");

    let table = load_experiment(root.path(), ExperimentFamily::MmOmp).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.family(), ExperimentFamily::MmOmp);
    assert!(!table.columns().iter().any(|c| c == "Exp"));
    assert_eq!(table.columns(), ["Matrix Size", "Block Size", "Op", "P", "Time"]);
    assert!(!table.has_performance());
}

#[test]
fn headers_and_fields_are_trimmed() {
    let root = TempDir::new().unwrap();
    write_csv(
        root.path(),
        ExperimentFamily::MmCuda,
        "cuda.csv",
        "Exp, Matrix Size, Block Size, Op, Time\n0, 2048, 16, 2, 0.125\n",
    );

    let table = load_experiment(root.path(), ExperimentFamily::MmCuda).unwrap();
    let row = &table.rows()[0];
    assert_eq!(row.matrix_size, 2048);
    assert_eq!(row.block_size, Some(16));
    assert_eq!(row.threads, None);
    assert_relative_eq!(row.time, 0.125);
}

#[test]
fn missing_folder_is_an_error() {
    let root = TempDir::new().unwrap();
    let err = load_experiment(root.path(), ExperimentFamily::LuSeq).unwrap_err();
    assert!(format!("{err:#}").contains("lu_seq"));
}

#[test]
fn empty_folder_is_an_error() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("lu_seq")).unwrap();
    let err = load_experiment(root.path(), ExperimentFamily::LuSeq).unwrap_err();
    assert!(format!("{err}").contains("no CSV files"));
}

#[test]
fn missing_required_column_is_an_error() {
    let root = TempDir::new().unwrap();
    write_csv(
        root.path(),
        ExperimentFamily::MmSyclCpu,
        "bad.csv",
        "Exp,Matrix Size,Block Size,Op\n0,512,8,1\n",
    );
    let err = load_experiment(root.path(), ExperimentFamily::MmSyclCpu).unwrap_err();
    assert!(format!("{err}").contains("\"Time\""));
}

#[test]
fn mismatched_schemas_are_rejected() {
    let root = TempDir::new().unwrap();
    write_csv(
        root.path(),
        ExperimentFamily::MmOmp,
        "a.csv",
        &format!("{OMP_HEADER}\n0,512,128,1,1,0.5\n"),
    );
    write_csv(
        root.path(),
        ExperimentFamily::MmOmp,
        "b.csv",
        "Exp,Matrix Size,Op,Time\n0,512,1,0.5\n",
    );
    let err = load_experiment(root.path(), ExperimentFamily::MmOmp).unwrap_err();
    assert!(format!("{err}").contains("has columns"));
}

#[test]
fn reordered_columns_share_a_schema() {
    let root = TempDir::new().unwrap();
    write_csv(
        root.path(),
        ExperimentFamily::MmOmp,
        "a.csv",
        &format!("{OMP_HEADER}\n0,512,128,1,1,0.5\n"),
    );
    write_csv(
        root.path(),
        ExperimentFamily::MmOmp,
        "b.csv",
        "Time,P,Op,Block Size,Matrix Size,Exp\n0.7,1,1,128,512,1\n",
    );
    let table = load_experiment(root.path(), ExperimentFamily::MmOmp).unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.rows().iter().all(|r| r.matrix_size == 512));
}

#[test]
fn unparsable_value_names_the_line() {
    let root = TempDir::new().unwrap();
    write_csv(
        root.path(),
        ExperimentFamily::LuSyclGpu,
        "gpu.csv",
        "Exp,Matrix Size,Block Size,Op,Time\n0,512,8,1,0.1\n0,abc,8,1,0.1\n",
    );
    let err = load_experiment(root.path(), ExperimentFamily::LuSyclGpu).unwrap_err();
    assert!(format!("{err}").contains("line 3"));
}

fn populate_all(root: &Path) {
    for family in ExperimentFamily::ALL {
        write_csv(
            root,
            family,
            "a.csv",
            &format!("{OMP_HEADER}\n0,512,128,1,1,0.5\n0,512,128,1,1,0.7\n0,1024,128,1,1,3.0\n"),
        );
        write_csv(
            root,
            family,
            "b.csv",
            &format!("{OMP_HEADER}\n1,1024,128,1,1,5.0\n"),
        );
    }
}

#[test]
fn context_loads_every_family_with_performance() {
    let root = TempDir::new().unwrap();
    populate_all(root.path());

    let context = ResultsContext::load(root.path()).unwrap();
    assert_eq!(context.tables().count(), ExperimentFamily::ALL.len());
    assert!(context.tables().all(|t| t.has_performance()));

    let mm = context.table(ExperimentFamily::MmOmp).unwrap();
    let lu = context.table(ExperimentFamily::LuSeq).unwrap();
    let n3 = 512f64.powi(3);
    assert_relative_eq!(mm.rows()[0].performance.unwrap(), 2.0 * n3 * 1e-9 / 0.5);
    assert_relative_eq!(lu.rows()[0].performance.unwrap(), 2.0 / 3.0 * n3 * 1e-9 / 0.5);
}

#[test]
fn context_requires_every_family() {
    let root = TempDir::new().unwrap();
    populate_all(root.path());
    fs::remove_dir_all(root.path().join("lu_func")).unwrap();

    let err = ResultsContext::load(root.path()).unwrap_err();
    assert!(format!("{err}").contains("lu_func"));
}

#[test]
fn loading_twice_aggregates_identically() {
    let root = TempDir::new().unwrap();
    populate_all(root.path());

    let first = ResultsContext::load(root.path()).unwrap();
    let second = ResultsContext::load(root.path()).unwrap();

    for family in ExperimentFamily::ALL {
        let a = first.table(family).unwrap().aggregate(
            Selection::op_with_threads(1, 1),
            GroupBy::MatrixAndBlockSize,
            PerformancePolicy::Averaged,
        );
        let b = second.table(family).unwrap().aggregate(
            Selection::op_with_threads(1, 1),
            GroupBy::MatrixAndBlockSize,
            PerformancePolicy::Averaged,
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_relative_eq!(a[0].time, 0.6);
        assert_relative_eq!(a[1].time, 4.0);
    }
}
