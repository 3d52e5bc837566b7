use std::cell::RefCell;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fortune_core::index::{IndexFile, IndexFlags, HEADER_SIZE};
use fortune_core::selection::read_entry;
use fortune_core::strfile::{default_index_path, sort_key, StrfileBuilder, StrfileConfig, StrfileStats};
use fortune_core::FortuneError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn build(source: &Path, config: StrfileConfig) -> StrfileStats {
    let mut rng = StdRng::seed_from_u64(7);
    StrfileBuilder::new(config)
        .build(source, &default_index_path(source), &mut rng)
        .unwrap()
}

/// Every entry in index order, decoded straight from the source bytes.
fn entries_in_index_order(source: &Path) -> Vec<String> {
    let mut index = IndexFile::open(&default_index_path(source)).unwrap();
    let delimiter = index.header.delimiter_line();
    let mut text = BufReader::new(fs::File::open(source).unwrap());
    (0..index.header.entry_count)
        .map(|i| {
            let offset = index.offset(i).unwrap();
            String::from_utf8(read_entry(&mut text, u64::from(offset), &delimiter).unwrap()).unwrap()
        })
        .collect()
}

#[test]
fn golden_two_entry_corpus() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "hello", "Hello\n%\nWorld\n%\n");

    let stats = build(&source, StrfileConfig::default());

    assert_eq!(stats.entry_count, 2);
    assert_eq!(stats.longest_entry_bytes, 6);
    assert_eq!(stats.shortest_entry_bytes, 6);
    assert_eq!(stats.flags, IndexFlags::empty());
    assert_eq!(entries_in_index_order(&source), vec!["Hello\n", "World\n"]);

    let index = IndexFile::open(&stats.index_path).unwrap();
    assert_eq!(index.header.delimiter, b'%');
    assert_eq!(index.header.version, 2);

    let bytes = fs::read(&stats.index_path).unwrap();
    assert_eq!(bytes.len() as u64, HEADER_SIZE + 8);
    assert_eq!(&bytes[HEADER_SIZE as usize..], &[0, 0, 0, 0, 0, 0, 0, 8]);
}

#[test]
fn invariant_counts_match_delimiter_lines() {
    let dir = tempdir().unwrap();
    let source = write_source(
        dir.path(),
        "mixed",
        "one\n%\ntwo lines\nof text\n%\n%\nthree\n%\ntrailing, not terminated\n",
    );

    let stats = build(&source, StrfileConfig::default());

    assert_eq!(stats.entry_count, 4);
    assert!(stats.shortest_entry_bytes <= stats.longest_entry_bytes);
    assert_eq!(stats.shortest_entry_bytes, 0);
    assert_eq!(stats.longest_entry_bytes, "two lines\nof text\n".len() as u32);
    assert_eq!(
        entries_in_index_order(&source),
        vec!["one\n", "two lines\nof text\n", "", "three\n"]
    );
}

#[test]
fn empty_source_builds_an_empty_index() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "empty", "");

    let stats = build(&source, StrfileConfig::default());

    assert_eq!(stats.entry_count, 0);
    assert_eq!(stats.longest_entry_bytes, 0);
    assert_eq!(stats.shortest_entry_bytes, u32::MAX);
    assert_eq!(fs::metadata(&stats.index_path).unwrap().len(), HEADER_SIZE);
}

#[test]
fn crlf_delimiter_lines_are_recognized() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "dos", "Hello\r\n%\r\nWorld\r\n%\r\n");

    let stats = build(&source, StrfileConfig::default());

    assert_eq!(stats.entry_count, 2);
    assert_eq!(entries_in_index_order(&source), vec!["Hello\r\n", "World\r\n"]);
}

#[test]
fn custom_delimiter() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "hash", "a\n%\nb\n#\nc\n#\n");

    let config = StrfileConfig {
        delimiter: "#".into(),
        ..StrfileConfig::default()
    };
    let stats = build(&source, config);

    assert_eq!(stats.entry_count, 2);
    assert_eq!(entries_in_index_order(&source), vec!["a\n%\nb\n", "c\n"]);
    assert_eq!(IndexFile::open(&stats.index_path).unwrap().header.delimiter, b'#');
}

#[test]
fn invariant_ordered_entries_are_non_decreasing() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "words", "pear\n%\nApple\n%\nbanana\n%\napple\n%\nCherry\n%\n");

    for ignore_case in [false, true] {
        let config = StrfileConfig {
            order: true,
            ignore_case,
            ..StrfileConfig::default()
        };
        let stats = build(&source, config);
        assert!(stats.flags.contains(IndexFlags::ORDERED));

        let keys: Vec<Vec<u8>> = entries_in_index_order(&source)
            .iter()
            .map(|e| sort_key(e.as_bytes(), ignore_case, false))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]), "ignore_case={ignore_case}");
    }
}

#[test]
fn ordering_is_stable_for_equal_keys() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "ties", "b\n%\nApple\n%\napple\n%\nAPPLE\n%\n");

    let config = StrfileConfig {
        order: true,
        ignore_case: true,
        ..StrfileConfig::default()
    };
    build(&source, config);

    assert_eq!(
        entries_in_index_order(&source),
        vec!["Apple\n", "apple\n", "APPLE\n", "b\n"]
    );
}

#[test]
fn randomize_permutes_source_offsets() {
    let dir = tempdir().unwrap();
    let content: String = (0..50).map(|i| format!("fortune {i}\n%\n")).collect();
    let source = write_source(dir.path(), "many", &content);

    let config = StrfileConfig {
        randomize: true,
        ..StrfileConfig::default()
    };
    let stats = build(&source, config);
    assert_eq!(stats.flags, IndexFlags::RANDOM);

    let shuffled = entries_in_index_order(&source);
    let mut sorted_back = shuffled.clone();
    sorted_back.sort_by_key(|e| e.trim_start_matches("fortune ").trim().parse::<u32>().unwrap());

    let original: Vec<String> = (0..50).map(|i| format!("fortune {i}\n")).collect();
    assert_eq!(sorted_back, original);
    assert_ne!(shuffled, original);
}

#[test]
fn order_wins_over_randomize() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "both", "c\n%\na\n%\nb\n%\n");

    let config = StrfileConfig {
        order: true,
        randomize: true,
        ..StrfileConfig::default()
    };
    let stats = build(&source, config);

    assert!(stats.flags.contains(IndexFlags::ORDERED));
    assert!(!stats.flags.contains(IndexFlags::RANDOM));
    assert_eq!(entries_in_index_order(&source), vec!["a\n", "b\n", "c\n"]);
}

#[test]
fn rot13_orders_by_plain_text_and_leaves_source_untouched() {
    let dir = tempdir().unwrap();
    // "Jbeyq" is "World", "Uryyb" is "Hello".
    let content = "Jbeyq\n%\nUryyb\n%\n";
    let source = write_source(dir.path(), "rotated", content);

    let config = StrfileConfig {
        rotate13: true,
        order: true,
        ..StrfileConfig::default()
    };
    let stats = build(&source, config);

    assert!(stats.flags.contains(IndexFlags::ROTATED));
    assert_eq!(entries_in_index_order(&source), vec!["Uryyb\n", "Jbeyq\n"]);
    assert_eq!(fs::read_to_string(&source).unwrap(), content);
}

#[test]
fn invalid_delimiters_are_rejected() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "x", "a\n%\n");

    // The header keeps one delimiter byte, so `%%` and `§` could not be read back.
    for delimiter in ["", "%\n", "\r", "%%", "§"] {
        let config = StrfileConfig {
            delimiter: delimiter.into(),
            ..StrfileConfig::default()
        };
        let result = StrfileBuilder::new(config).build(&source, &dir.path().join("x.dat"), &mut StdRng::seed_from_u64(1));
        assert!(
            matches!(result, Err(FortuneError::InvalidDelimiter(_))),
            "{delimiter:?} was accepted"
        );
        assert!(!dir.path().join("x.dat").exists());
    }
}

#[test]
fn missing_source_is_unreadable() {
    let dir = tempdir().unwrap();
    let result = StrfileBuilder::new(StrfileConfig::default()).build(
        &dir.path().join("nope"),
        &dir.path().join("nope.dat"),
        &mut StdRng::seed_from_u64(1),
    );
    assert!(matches!(result, Err(FortuneError::SourceUnreadable { .. })));
}

#[test]
fn unwritable_destination() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "x", "a\n%\n");
    let result = StrfileBuilder::new(StrfileConfig::default()).build(
        &source,
        &dir.path().join("no_such_dir").join("x.dat"),
        &mut StdRng::seed_from_u64(1),
    );
    assert!(matches!(result, Err(FortuneError::DestinationUnwritable { .. })));
}

#[test]
fn no_temporary_file_is_left_behind() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "x", "a\n%\n");
    build(&source, StrfileConfig::default());

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    let mut names = names;
    names.sort();
    assert_eq!(names, vec!["x", "x.dat"]);
}

#[test]
fn observer_receives_final_stats() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "obs", "a\n%\nbbb\n%\n");

    let seen: Rc<RefCell<Option<StrfileStats>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let stats = StrfileBuilder::new(StrfileConfig::default())
        .with_observer(move |stats| *sink.borrow_mut() = Some(stats.clone()))
        .build(&source, &default_index_path(&source), &mut StdRng::seed_from_u64(3))
        .unwrap();

    assert_eq!(seen.borrow().as_ref(), Some(&stats));
}

#[test]
fn golden_summary_wording() {
    let stats = StrfileStats {
        index_path: PathBuf::from("wisdom.dat"),
        entry_count: 3,
        longest_entry_bytes: 120,
        shortest_entry_bytes: 4,
        flags: IndexFlags::empty(),
    };
    assert_eq!(
        stats.summary(),
        "\"wisdom.dat\" created\nThere were 3 strings\nLongest string: 120 bytes\nShortest string: 4 bytes\n"
    );

    let empty = StrfileStats {
        entry_count: 0,
        ..stats.clone()
    };
    assert_eq!(empty.summary(), "\"wisdom.dat\" created\nThere was no string\n");

    let single = StrfileStats { entry_count: 1, ..stats };
    assert!(single.summary().contains("There was 1 string\n"));
}

#[test]
fn default_index_path_replaces_extension() {
    assert_eq!(default_index_path(Path::new("a/wisdom.txt")), PathBuf::from("a/wisdom.dat"));
    assert_eq!(default_index_path(Path::new("a/wisdom")), PathBuf::from("a/wisdom.dat"));
}

#[test]
fn config_serializes_with_explicit_defaults() {
    let config: StrfileConfig = serde_json::from_str(r#"{"order": true}"#).unwrap();
    assert_eq!(
        config,
        StrfileConfig {
            order: true,
            ..StrfileConfig::default()
        }
    );
    assert_eq!(config.delimiter, "%");
}
