use biblink::blocking::{block, BlockingStrategy};
use biblink::clustering::ClusteringMethod;
use biblink::evaluation::{baseline, compare_match_files, confusion};
use biblink::matching::{match_pairs, Match};
use biblink::persist::{read_matches_from_path, CsvMatchSink, NullSink};
use biblink::record::{load_dataset_pair, ColumnMapping, Dataset, RawRecord};
use biblink::similarity::SimilarityMethod;
use biblink::{run_pipeline, ExecutionMode, ResolutionConfig, ResolutionError};
use std::fs;
use std::path::Path;

fn five_by_five() -> (Dataset, Dataset) {
    Dataset::pair(
        "acm",
        vec![
            RawRecord::new("A1", "Adaptive query processing", Some("Deshpande Ives Raman"), 2007),
            RawRecord::new("A2", "Bloom filter variants", Some("Broder Mitzenmacher"), 1999),
            RawRecord::new(
                "A3",
                "Efficient skyline computation over low cardinality domains",
                Some("Morse Patel Jagadish"),
                2007,
            ),
            RawRecord::new("A4", "Granular locking protocols", Some("Gray Lorie"), 1976),
            RawRecord::new("A5", "Histogram construction", Some("Poosala Ioannidis"), 1996),
        ],
        "dblp",
        vec![
            RawRecord::new("B1", "Tree indexing for spatial data", Some("Guttman"), 1984),
            RawRecord::new(
                "B2",
                "Efficient skyline computation over low cardinality domains",
                Some("Morse Patel Jagadish"),
                2007,
            ),
            RawRecord::new(
                "B3",
                "Cube materialization",
                Some("Harinarayan Rajaraman Ullman"),
                1996,
            ),
            RawRecord::new("B4", "Learned cardinalities", None, 2019),
            RawRecord::new("B5", "Join synopses", Some("Acharya Gibbons"), 1999),
        ],
    )
    .unwrap()
}

fn disjoint() -> (Dataset, Dataset) {
    Dataset::pair(
        "left",
        vec![
            RawRecord::new("l1", "alpha beta", Some("xq"), 2000),
            RawRecord::new("l2", "gamma delta", None, 2001),
            RawRecord::new("l3", "epsilon zeta", Some("kw"), 2000),
        ],
        "right",
        vec![
            RawRecord::new("r1", "eta theta", Some("zz"), 2000),
            RawRecord::new("r2", "iota kappa", None, 2001),
            RawRecord::new("r3", "lambda mu", Some("pv"), 2000),
            RawRecord::new("r4", "nu xi", None, 2002),
        ],
    )
    .unwrap()
}

fn config(blocking: BlockingStrategy, execution: ExecutionMode) -> ResolutionConfig {
    ResolutionConfig {
        blocking_method: blocking,
        matching_method: SimilarityMethod::Combined,
        threshold: 0.5,
        clustering_method: ClusteringMethod::ConnectedComponents,
        baseline: true,
        execution,
        ..ResolutionConfig::default()
    }
}

#[test]
fn test_identical_records_resolve_to_one_entity() {
    let (a, b) = five_by_five();
    let a3 = a.records()[2].id;
    let b2 = b.records()[1].id;
    assert_eq!((a3, b2), (2, 6));

    let candidates: Vec<_> = block(&a, &b, BlockingStrategy::FirstLetterTitle)
        .unwrap()
        .map(|pair| (pair.left_id(), pair.right_id()))
        .collect();
    assert!(candidates.contains(&(a3, b2)));

    let outcome = run_pipeline(
        &a,
        &b,
        &config(BlockingStrategy::FirstLetterTitle, ExecutionMode::Local),
        &mut NullSink,
    )
    .unwrap();

    assert_eq!(outcome.matches.len(), 1);
    let m = &outcome.matches[0];
    assert_eq!((m.left_id(), m.right_id()), (a3, b2));
    assert_eq!(m.similarity_score, 1.0);

    let clustering = outcome.clustering.as_ref().unwrap();
    assert_eq!(clustering.len(), 10 - 1);
    assert_eq!(clustering.component_of(a3), clustering.component_of(b2));
    assert_eq!(clustering.representative_of(a3), Some(a3.max(b2)));
    assert_eq!(clustering.vertex_count(), 10);

    let counts = outcome.baseline.unwrap();
    assert_eq!(counts.true_positive, 1);
    assert_eq!(counts.false_negative, 0);
    assert_eq!(counts.false_positive, 0);
    assert!((outcome.match_rate() - 0.1).abs() < 1e-12);
}

#[test]
fn test_disjoint_datasets_give_only_singletons() {
    let (a, b) = disjoint();
    for strategy in BlockingStrategy::ALL {
        let outcome =
            run_pipeline(&a, &b, &config(strategy, ExecutionMode::Local), &mut NullSink).unwrap();
        assert!(outcome.matches.is_empty(), "{}", strategy);

        let clustering = outcome.clustering.unwrap();
        assert_eq!(clustering.len(), a.len() + b.len());
        assert!(clustering.clusters().iter().all(|c| c.size() == 1));

        let counts = outcome.baseline.unwrap();
        assert_eq!(counts.recall(), None);
        assert_eq!(counts.precision(), None);
    }
}

#[test]
fn test_engines_agree() {
    let (a, b) = five_by_five();
    for strategy in BlockingStrategy::ALL {
        let local =
            run_pipeline(&a, &b, &config(strategy, ExecutionMode::Local), &mut NullSink).unwrap();
        let partitioned = run_pipeline(
            &a,
            &b,
            &config(strategy, ExecutionMode::Partitioned { workers: 3 }),
            &mut NullSink,
        )
        .unwrap();

        assert_eq!(local.matches, partitioned.matches);
        assert_eq!(local.stats, partitioned.stats);
        assert_eq!(local.clustering, partitioned.clustering);
        assert_eq!(local.baseline, partitioned.baseline);
    }
}

#[test]
fn test_blocked_matches_are_subset_of_baseline() {
    let (a, b) = five_by_five();
    let truth = baseline(&a, &b, 0.2, SimilarityMethod::Combined).unwrap();
    for strategy in BlockingStrategy::ALL {
        let (matches, _) = match_pairs(
            block(&a, &b, strategy).unwrap(),
            0.2,
            SimilarityMethod::Combined,
        );
        let counts = confusion(&truth, &matches);
        assert_eq!(counts.true_positive + counts.false_negative, truth.len());
        assert_eq!(counts.true_positive + counts.false_positive, matches.len());
        assert_eq!(counts.false_positive, 0);
    }
}

#[test]
fn test_invalid_threshold_aborts_run() {
    let (a, b) = five_by_five();
    let mut bad = config(BlockingStrategy::Year, ExecutionMode::Local);
    bad.threshold = 1.5;
    let mut sink: Vec<Match> = Vec::new();
    let err = run_pipeline(&a, &b, &bad, &mut sink).unwrap_err();
    assert!(matches!(err, ResolutionError::Configuration(_)));
    assert!(sink.is_empty());
}

fn write_csv(path: &Path, body: &str) {
    fs::write(path, format!("paper ID,paper title,author names,year\n{}", body)).unwrap();
}

#[test]
fn test_persisted_matches_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("acm.csv");
    let path_b = dir.path().join("dblp.csv");
    write_csv(
        &path_a,
        "A1,Mining association rules,\"Agrawal, Srikant\",1994\n\
         A2,Skyline operator,,2001\n\
         A3,The R*-tree,Beckmann,1990.0\n",
    );
    write_csv(
        &path_b,
        "B1,Skyline operator,Borzsonyi,2001\n\
         B2,Mining association rules,\"Agrawal, Srikant\",1994\n",
    );

    let (a, b) = load_dataset_pair(&path_a, &path_b, &ColumnMapping::default()).unwrap();
    assert_eq!(b.records()[0].id, 3);

    let local_path = dir.path().join("out").join("local.csv");
    let mut sink = CsvMatchSink::create(&local_path).unwrap();
    let local = run_pipeline(
        &a,
        &b,
        &config(BlockingStrategy::CrossProduct, ExecutionMode::Local),
        &mut sink,
    )
    .unwrap();
    drop(sink);
    assert_eq!(local.matches.len(), 2);
    assert_eq!(read_matches_from_path(&local_path).unwrap(), local.matches);

    let partitioned_path = dir.path().join("out").join("partitioned.csv");
    let mut sink = CsvMatchSink::create(&partitioned_path).unwrap();
    run_pipeline(
        &a,
        &b,
        &config(BlockingStrategy::CrossProduct, ExecutionMode::Partitioned { workers: 2 }),
        &mut sink,
    )
    .unwrap();
    drop(sink);

    let counts = compare_match_files(&local_path, &partitioned_path).unwrap();
    assert_eq!(counts.true_positive, 2);
    assert_eq!(counts.false_negative + counts.false_positive, 0);
}

#[test]
fn test_missing_title_is_data_shape_error() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.csv");
    let path_b = dir.path().join("b.csv");
    write_csv(&path_a, "A1,,Someone,2000\n");
    write_csv(&path_b, "B1,Title,Someone,2000\n");

    let err = load_dataset_pair(&path_a, &path_b, &ColumnMapping::default()).unwrap_err();
    assert!(matches!(err, ResolutionError::DataShape { row: 1, .. }));
}

#[test]
fn test_default_config_skips_baseline() {
    let (a, b) = five_by_five();
    let outcome = run_pipeline(&a, &b, &ResolutionConfig::default(), &mut NullSink).unwrap();
    assert!(outcome.baseline.is_none());
    assert!(outcome.clustering.is_some());
}
