//! This bench measures building, parsing and preening the keys of a large
//! requirements model.

#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use reqmodel::{Key, Qualifier, preen_key};

/// Builds every key of a model with a few entities of each kind.
fn build_model() -> Vec<Key> {
    let mut keys = Vec::new();
    let domain = Key::new_domain("domain").unwrap();
    keys.push(domain.clone());
    for s in 0..10 {
        let subdomain = Key::new_subdomain(&domain, &format!("subdomain_{s}")).unwrap();
        keys.push(Key::new_use_case(&subdomain, "use_case").unwrap());
        for c in 0..10 {
            let class = Key::new_class(&subdomain, &format!("class_{c}")).unwrap();
            let action = Key::new_action(&class, "action").unwrap();
            keys.push(Key::new_guard(&class, "guard").unwrap());
            for st in 0..5 {
                let state = Key::new_state(&class, &format!("state_{st}")).unwrap();
                for qualifier in Qualifier::ALL {
                    keys.push(Key::new_state_action(&state, &action, qualifier, "fire").unwrap());
                }
                keys.push(state);
            }
            keys.push(action);
            keys.push(class);
        }
        keys.push(subdomain);
    }
    keys
}

fn keys(c: &mut Criterion) {
    c.bench_function("build model keys", |b| b.iter(build_model));

    let stored: Vec<String> = build_model().into_iter().map(String::from).collect();
    c.bench_function("parse model keys", |b| {
        b.iter(|| {
            for raw in &stored {
                Key::parse(raw).unwrap();
            }
        });
    });

    let shouted: Vec<String> = stored.iter().map(|raw| raw.to_uppercase()).collect();
    c.bench_function("preen model keys", |b| {
        b.iter(|| {
            for raw in &shouted {
                preen_key(raw).unwrap();
            }
        });
    });
}

criterion_group!(benches, keys);
criterion_main!(benches);
