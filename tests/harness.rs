use biblink::harness::{create_variants, run_scalability, HarnessOptions};
use biblink::persist::write_scalability_results;
use biblink::record::{load_dataset, ColumnMapping, DatasetTag};
use biblink::{ExecutionMode, ResolutionConfig, ResolutionError};
use std::fs;
use std::path::PathBuf;

fn source_files(dir: &std::path::Path) -> Vec<PathBuf> {
    let acm = dir.join("acm.csv");
    let dblp = dir.join("dblp.csv");
    fs::write(
        &acm,
        "paper ID,paper title,author names,year\n\
         A1,Mining association rules between sets of items,Agrawal Imielinski Swami,1993\n\
         A2,The skyline operator,Borzsonyi Kossmann Stocker,2001\n\
         A3,Access path selection,,1979\n",
    )
    .unwrap();
    fs::write(
        &dblp,
        "paper ID,paper title,author names,year\n\
         B1,Mining association rules between sets of items,Agrawal Imielinski Swami,1993\n\
         B2,The skyline operator,Borzsonyi Kossmann Stocker,2001\n\
         B3,Query evaluation techniques,Graefe,1993\n\
         B4,Access path selection,,1979\n",
    )
    .unwrap();
    vec![acm, dblp]
}

#[test]
fn test_create_variants_layout() {
    let dir = tempfile::tempdir().unwrap();
    let files = source_files(dir.path());
    let options = HarnessOptions::new(dir.path().join("variants"));
    let mapping = ColumnMapping::default();

    let variants = create_variants(&files, &options, &mapping).unwrap();
    let names: Vec<String> = variants
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "acm_year4.csv",
            "acm_auth4.csv",
            "acm_titl4.csv",
            "dblp_year4.csv",
            "dblp_auth4.csv",
            "dblp_titl4.csv"
        ]
    );
    assert!(variants[0].starts_with(dir.path().join("variants").join("acm")));

    let original = load_dataset(&files[0], DatasetTag::A, 0, &mapping).unwrap();
    let shifted = load_dataset(&variants[0], DatasetTag::A, 0, &mapping).unwrap();
    assert_eq!(original.len(), shifted.len());
    for (before, after) in original.records().iter().zip(shifted.records()) {
        assert_eq!(after.year, before.year - 2);
        assert_eq!(after.title, before.title);
        assert_eq!(after.external_id, before.external_id);
    }

    let titles = load_dataset(&variants[2], DatasetTag::A, 0, &mapping).unwrap();
    assert_eq!(titles.records()[2].authors, None);
    for (before, after) in original.records().iter().zip(titles.records()) {
        assert_eq!(after.title.chars().count(), before.title.chars().count());
        assert_eq!(after.year, before.year);
    }
}

#[test]
fn test_variants_are_reproducible_for_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let files = source_files(dir.path());
    let mapping = ColumnMapping::default();

    let mut options = HarnessOptions::new(dir.path().join("first"));
    options.seed = 11;
    let first = create_variants(&files, &options, &mapping).unwrap();
    options.out_dir = dir.path().join("second");
    let second = create_variants(&files, &options, &mapping).unwrap();

    for (x, y) in first.iter().zip(&second) {
        assert_eq!(fs::read_to_string(x).unwrap(), fs::read_to_string(y).unwrap());
    }
}

#[test]
fn test_scalability_grid() {
    let dir = tempfile::tempdir().unwrap();
    let files = source_files(dir.path());
    let mut options = HarnessOptions::new(dir.path().join("variants"));
    options.modes = vec![ExecutionMode::Local, ExecutionMode::Partitioned { workers: 2 }];

    let rows = run_scalability(&files, &options, &ResolutionConfig::default()).unwrap();
    assert_eq!(rows.len(), 3 * 3 * 2);
    assert_eq!(rows[0].pair, "acm_year4-dblp_year4");
    assert_eq!(rows[0].mode, "local");
    assert_eq!(rows[1].mode, "partitioned(2)");

    for pair in rows.chunks(2) {
        assert_eq!(pair[0].pair, pair[1].pair);
        assert_eq!(pair[0].matches, pair[1].matches);
        assert_eq!(pair[0].records, 7);
        assert!(pair[0].total_secs >= pair[0].blocking_matching_secs);
        assert!((pair[0].match_rate - pair[0].matches as f64 / 7.0).abs() < 1e-12);
    }

    // Both year-shifted variants keep titles, authors and equal years.
    assert_eq!(rows[0].matches, 3);

    let mut out = Vec::new();
    write_scalability_results(&mut out, &rows).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), rows.len() + 1);
    assert!(text.starts_with("started_at,pair,dataset_a,dataset_b,mode,"));
}

#[test]
fn test_single_variant_has_no_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let files = source_files(dir.path());
    let mut options = HarnessOptions::new(dir.path().join("variants"));
    options.variants_per_file = 1;

    let rows = run_scalability(&files[..1], &options, &ResolutionConfig::default()).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_inputs_sharing_a_name_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (x, y) = (dir.path().join("x"), dir.path().join("y"));
    fs::create_dir_all(&x).unwrap();
    fs::create_dir_all(&y).unwrap();
    let first = source_files(&x);
    let second = source_files(&y);
    let files = vec![first[1].clone(), second[1].clone()];
    let out_dir = dir.path().join("variants");
    let options = HarnessOptions::new(&out_dir);

    let err = create_variants(&files, &options, &ColumnMapping::default()).unwrap_err();
    assert!(matches!(err, ResolutionError::Configuration(_)));
    assert!(!out_dir.exists());
}
