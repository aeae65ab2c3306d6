pub mod keyring;

pub use self::keyring::KeyringStore;
