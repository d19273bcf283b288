//! Cache keys built from the target type, method name and arguments.
//!
//! Keys have the form `<type-name>#<method>:<hash>`, where the hash covers
//! the type name, the method name and the arguments. Keys are stable for the
//! lifetime of the process; they are not meant to be persisted.

use std::hash::{DefaultHasher, Hash, Hasher};

/// Generate the cache key for calling `method` on `target` with `args`.
///
/// Equal type, method and structurally-equal arguments give equal keys.
pub fn generate_key<T, A>(_target: &T, method: &str, args: &A) -> String
where
    T: ?Sized,
    A: Hash + ?Sized,
{
    let type_name = std::any::type_name::<T>();

    let mut hasher = DefaultHasher::new();
    type_name.hash(&mut hasher);
    method.hash(&mut hasher);
    args.hash(&mut hasher);

    format!("{}#{}:{:016x}", type_name, method, hasher.finish())
}
