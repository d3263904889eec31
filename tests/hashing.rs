use vnode_router::{DefaultHashing, HashingFunction, Md5Hashing, Xxh3Hashing, DEFAULT_SEED};

#[test]
fn default_hashing() {
    let hashing = DefaultHashing::new();
    assert_eq!(hashing.hash("hello"), 0x5d41402a);
    assert_eq!(hashing.hash(""), 0xd41d8cd9);
}

#[test]
fn md5_prefix_is_big_endian() {
    let hashing = Md5Hashing::new();
    assert_eq!(hashing.hash("192.168.0.1"), 0xf0fdb4c3);
    assert_eq!(hashing.hash("IDC1-127.0.0.1:8080-0"), 0xf2b70a73);
    assert_eq!(hashing.hash("IDC1-127.0.0.1:8080-0"), 4072082035);
}

#[test]
fn xxh3_spans_full_ring() {
    let hashing = Xxh3Hashing::new();
    assert_eq!(hashing.seed(), DEFAULT_SEED);

    let above_32_bits = (0..64)
        .map(|i| hashing.hash(&format!("key-{i}")))
        .filter(|pos| *pos > u64::from(u32::MAX))
        .count();
    assert!(above_32_bits > 0);
}

#[test]
fn deterministic() {
    let md5 = Md5Hashing::new();
    let xxh3 = Xxh3Hashing::with_seed(99);
    for i in 0..100 {
        let key = format!("object-{i}");
        assert_eq!(md5.hash(&key), Md5Hashing::new().hash(&key));
        assert_eq!(xxh3.hash(&key), Xxh3Hashing::with_seed(99).hash(&key));
    }
}
