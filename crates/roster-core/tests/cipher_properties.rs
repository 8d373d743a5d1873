use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use roster_core::crypto::{EncryptionContext, Fields, SaltPolicy};
use roster_core::RosterError;

struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be available")
            .as_nanos();
        let filename = format!("{}_{}_{}.bin", prefix, std::process::id(), nanos);
        let path = std::env::temp_dir().join(filename);
        Self { path }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn sample_fields() -> Fields {
    [
        ("surname", "Kuznetsova"),
        ("first_name", "Elena"),
        ("patronymic", "Sergeevna"),
        ("phone", "+7 900 123-45-67"),
        ("address", "ул. Ленина, 5"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn test_round_trip_under_every_salt_policy() {
    let policies = [
        SaltPolicy::Embedded,
        SaltPolicy::Deployment(b"deployment-salt-for-tests".to_vec()),
        SaltPolicy::PerRecord,
    ];
    for policy in policies {
        let ctx = EncryptionContext::initialize("correct horse battery", &policy)
            .expect("context should initialize");
        let envelope = ctx.encrypt(&sample_fields()).expect("encrypt should succeed");
        let fields = ctx.decrypt(&envelope).expect("decrypt should succeed");
        assert_eq!(fields, sample_fields(), "policy {:?}", policy);
    }
}

#[test]
fn test_other_password_cannot_decrypt() {
    let owner = EncryptionContext::new("password-one").expect("context");
    let intruder = EncryptionContext::new("password-two").expect("context");

    let envelope = owner.encrypt(&sample_fields()).expect("encrypt");
    let result = intruder.decrypt(&envelope);

    assert!(matches!(result, Err(RosterError::Decryption(_))));
}

#[test]
fn test_every_flipped_byte_is_detected() {
    let ctx = EncryptionContext::new("tamper-test-password").expect("context");
    let envelope = ctx.encrypt(&sample_fields()).expect("encrypt");
    let raw = STANDARD.decode(&envelope).expect("envelope is base64");

    for index in 0..raw.len() {
        let mut tampered = raw.clone();
        tampered[index] ^= 0x01;
        let result = ctx.decrypt(&STANDARD.encode(&tampered));
        assert!(
            matches!(result, Err(RosterError::Decryption(_))),
            "flip at byte {} was not detected",
            index
        );
    }
}

#[test]
fn test_sealed_file_round_trip() {
    let plain = TempFile::new("roster_seal_plain");
    let sealed = TempFile::new("roster_seal_sealed");
    let restored = TempFile::new("roster_seal_restored");
    let contents = b"class list 7B\nIvanova Maria\n";
    fs::write(&plain.path, contents).expect("write should succeed");

    let ctx = EncryptionContext::new("file-password").expect("context");
    ctx.encrypt_file(&plain.path, &sealed.path)
        .expect("seal should succeed");
    let on_disk = fs::read(&sealed.path).expect("read should succeed");
    assert_ne!(on_disk.as_slice(), contents.as_slice());

    ctx.decrypt_file(&sealed.path, &restored.path)
        .expect("unseal should succeed");
    assert_eq!(
        fs::read(&restored.path).expect("read should succeed"),
        contents
    );
}

#[test]
fn test_unseal_with_wrong_password_writes_nothing() {
    let plain = TempFile::new("roster_unseal_plain");
    let sealed = TempFile::new("roster_unseal_sealed");
    let restored = TempFile::new("roster_unseal_restored");
    fs::write(&plain.path, b"secret").expect("write should succeed");

    EncryptionContext::new("right-password")
        .expect("context")
        .encrypt_file(&plain.path, &sealed.path)
        .expect("seal should succeed");

    let result = EncryptionContext::new("wrong-password")
        .expect("context")
        .decrypt_file(&sealed.path, &restored.path);
    assert!(matches!(result, Err(RosterError::Decryption(_))));
    assert!(!restored.path.exists());
}
