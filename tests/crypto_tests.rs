//! Integration tests for the credvault crypto layer.

use credvault::crypto::{
    self, derive, generate_nonce, generate_salt, open, seal, sign, verify, Password, SecretKey,
};
use credvault::errors::CredVaultError;

const FAST: u32 = 1_000;

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derive_is_deterministic() {
    let salt = [9u8; crypto::SALT_LEN];
    let a = derive(b"Correct-Horse1!", &salt, FAST).unwrap();
    let b = derive(b"Correct-Horse1!", &salt, FAST).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn derive_depends_on_every_input() {
    let salt = [9u8; crypto::SALT_LEN];
    let base = derive(b"pw", &salt, FAST).unwrap();

    assert_ne!(derive(b"pW", &salt, FAST).unwrap().as_bytes(), base.as_bytes());
    assert_ne!(
        derive(b"pw", &[8u8; crypto::SALT_LEN], FAST).unwrap().as_bytes(),
        base.as_bytes()
    );
    assert_ne!(derive(b"pw", &salt, FAST + 1).unwrap().as_bytes(), base.as_bytes());
}

#[test]
fn derive_rejects_bad_parameters() {
    assert!(matches!(
        derive(b"pw", &[0u8; crypto::SALT_LEN], 0),
        Err(CredVaultError::DerivationError(_))
    ));
    assert!(matches!(
        derive(b"pw", &[0u8; 8], FAST),
        Err(CredVaultError::DerivationError(_))
    ));
}

#[test]
fn salts_are_random() {
    assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
}

// ---------------------------------------------------------------------------
// Authenticated cipher
// ---------------------------------------------------------------------------

#[test]
fn seal_open_roundtrip() {
    let key = SecretKey::generate().unwrap();
    let nonce = generate_nonce().unwrap();
    let ciphertext = seal(&key, &nonce, b"{\"credentials\":[]}").unwrap();

    assert_eq!(ciphertext.len(), 18 + crypto::TAG_LEN);
    let plaintext = open(&key, &nonce, &ciphertext).unwrap();
    assert_eq!(plaintext.as_slice(), b"{\"credentials\":[]}");
}

#[test]
fn any_changed_ciphertext_byte_fails() {
    let key = SecretKey::generate().unwrap();
    let nonce = generate_nonce().unwrap();
    let ciphertext = seal(&key, &nonce, b"hunter2").unwrap();

    for i in 0..ciphertext.len() {
        let mut altered = ciphertext.clone();
        altered[i] ^= 0x80;
        assert!(
            matches!(
                open(&key, &nonce, &altered),
                Err(CredVaultError::AuthenticationFailure)
            ),
            "byte {i} went unnoticed"
        );
    }
}

#[test]
fn wrong_key_or_nonce_fails() {
    let key = SecretKey::generate().unwrap();
    let nonce = generate_nonce().unwrap();
    let ciphertext = seal(&key, &nonce, b"hunter2").unwrap();

    let other_key = SecretKey::generate().unwrap();
    assert!(open(&other_key, &nonce, &ciphertext).is_err());

    let other_nonce = generate_nonce().unwrap();
    assert!(open(&key, &other_nonce, &ciphertext).is_err());
}

#[test]
fn truncated_ciphertext_fails() {
    let key = SecretKey::generate().unwrap();
    let nonce = generate_nonce().unwrap();
    assert!(matches!(
        open(&key, &nonce, &[0u8; crypto::TAG_LEN - 1]),
        Err(CredVaultError::AuthenticationFailure)
    ));
}

// ---------------------------------------------------------------------------
// Integrity signer
// ---------------------------------------------------------------------------

#[test]
fn sign_verify_and_flips() {
    let signing_key = SecretKey::generate().unwrap();
    let salt = [1u8; crypto::SALT_LEN];
    let nonce = [2u8; crypto::NONCE_LEN];
    let ciphertext = vec![3u8; 40];

    let mac = sign(&signing_key, &salt, &nonce, FAST, &ciphertext).unwrap();
    assert!(verify(&mac, &signing_key, &salt, &nonce, FAST, &ciphertext));

    let mut bad_mac = mac;
    bad_mac[31] ^= 0x01;
    assert!(!verify(&bad_mac, &signing_key, &salt, &nonce, FAST, &ciphertext));

    let mut bad_salt = salt;
    bad_salt[0] ^= 0x01;
    assert!(!verify(&mac, &signing_key, &bad_salt, &nonce, FAST, &ciphertext));

    let mut bad_nonce = nonce;
    bad_nonce[11] ^= 0x01;
    assert!(!verify(&mac, &signing_key, &salt, &bad_nonce, FAST, &ciphertext));

    assert!(!verify(&mac, &signing_key, &salt, &nonce, FAST ^ 1, &ciphertext));

    let mut bad_ct = ciphertext.clone();
    bad_ct[20] ^= 0x01;
    assert!(!verify(&mac, &signing_key, &salt, &nonce, FAST, &bad_ct));

    let other_key = SecretKey::generate().unwrap();
    assert!(!verify(&mac, &other_key, &salt, &nonce, FAST, &ciphertext));
}

// ---------------------------------------------------------------------------
// Secret buffers
// ---------------------------------------------------------------------------

#[test]
fn secrets_are_redacted_in_debug_output() {
    let password = Password::from("hunter2");
    assert!(!format!("{password:?}").contains("hunter2"));

    let key = SecretKey::new([0xAB; crypto::KEY_LEN]);
    assert!(!format!("{key:?}").contains("171"));
}
