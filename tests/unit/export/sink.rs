use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "cubefield_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::whole(30).unwrap(),
        total_frames: 3,
    }
}

#[test]
fn file_stem_zero_pads_to_five_digits() {
    assert_eq!(FrameKey::new("orbit", FrameIndex(7)).file_stem(), "orbit_00007");
    assert_eq!(
        FrameKey::new("orbit", FrameIndex(123_456)).file_stem(),
        "orbit_123456"
    );
}

#[test]
fn in_memory_sink_records_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(&cfg()).unwrap();
    for i in 0..3 {
        sink.persist(
            &FrameKey::new("s", FrameIndex(i)),
            &FrameImage::solid(4, 2, [i as u8, 0, 0, 255]),
        )
        .unwrap();
    }
    sink.end().unwrap();
    assert!(sink.ended);
    assert!(!sink.aborted);
    let indices: Vec<u64> = sink.frames.iter().map(|(k, _)| k.index.0).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn directory_sink_writes_readable_pngs() {
    let dir = temp_dir("directory_sink");
    let mut sink = DirectorySink::new(&dir);
    sink.begin(&cfg()).unwrap();
    let key = FrameKey::new("seq", FrameIndex(2));
    sink.persist(&key, &FrameImage::solid(4, 2, [10, 20, 30, 255]))
        .unwrap();
    sink.end().unwrap();

    let path = dir.join("seq_00002.png");
    assert_eq!(sink.written(), &[path.clone()]);
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(3, 1).0, [10, 20, 30, 255]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn directory_sink_persist_failure_is_a_persist_error() {
    let dir = temp_dir("directory_sink_missing");
    // No begin(): the directory does not exist.
    let mut sink = DirectorySink::new(dir.join("nested"));
    let err = sink
        .persist(
            &FrameKey::new("seq", FrameIndex(0)),
            &FrameImage::solid(2, 2, [0, 0, 0, 255]),
        )
        .unwrap_err();
    assert!(matches!(err, CubefieldError::Persist(_)));
}
