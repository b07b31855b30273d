//! FocusArbiter state machine tests

use bridge_desktop::LocalFocusProvider;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, CapabilitySlot, FocusChange, FocusChangeListener, FocusGrant, FocusProvider,
    FocusResponse,
};
use core_playback::{FocusArbiter, FocusState};
use mockall::mock;
use mockall::predicate::eq;
use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use std::thread;

mock! {
    Provider {}

    impl FocusProvider for Provider {
        fn request_focus(
            &self,
            listener: Arc<dyn FocusChangeListener>,
        ) -> BridgeResult<FocusResponse>;
        fn release_focus(&self, grant: FocusGrant) -> BridgeResult<()>;
    }
}

fn arbiter_with(provider: MockProvider) -> FocusArbiter {
    FocusArbiter::new(CapabilitySlot::with(Arc::new(provider) as Arc<dyn FocusProvider>))
}

#[test]
fn repeated_request_acquires_once() {
    let mut provider = MockProvider::new();
    provider
        .expect_request_focus()
        .times(1)
        .returning(|_| Ok(FocusResponse::Granted(FocusGrant::new(7))));

    let arbiter = arbiter_with(provider);
    arbiter.request();
    arbiter.request();
    assert_eq!(arbiter.state(), FocusState::Held);
}

#[test]
fn release_hands_back_the_held_grant() {
    let mut provider = MockProvider::new();
    provider
        .expect_request_focus()
        .returning(|_| Ok(FocusResponse::Granted(FocusGrant::new(7))));
    provider
        .expect_release_focus()
        .with(eq(FocusGrant::new(7)))
        .times(1)
        .returning(|_| Ok(()));

    let arbiter = arbiter_with(provider);
    arbiter.request();
    arbiter.release();
    arbiter.release();
    assert_eq!(arbiter.state(), FocusState::Released);
}

#[test]
fn release_while_released_never_reaches_provider() {
    let mut provider = MockProvider::new();
    provider.expect_release_focus().never();

    let arbiter = arbiter_with(provider);
    arbiter.release();
    assert_eq!(arbiter.state(), FocusState::Released);
}

#[test]
fn denial_and_errors_stay_released() {
    let mut provider = MockProvider::new();
    let mut seq = mockall::Sequence::new();
    provider
        .expect_request_focus()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(FocusResponse::Denied));
    provider
        .expect_request_focus()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(BridgeError::OperationFailed("audio service busy".to_string())));
    provider
        .expect_request_focus()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(FocusResponse::Granted(FocusGrant::new(1))));

    let arbiter = arbiter_with(provider);
    arbiter.request();
    assert_eq!(arbiter.state(), FocusState::Released);
    arbiter.request();
    assert_eq!(arbiter.state(), FocusState::Released);
    arbiter.request();
    assert_eq!(arbiter.state(), FocusState::Held);
}

#[test]
fn external_loss_releases_without_calling_provider() {
    let mut provider = MockProvider::new();
    provider
        .expect_request_focus()
        .returning(|_| Ok(FocusResponse::Granted(FocusGrant::new(3))));
    provider.expect_release_focus().never();

    let arbiter = arbiter_with(provider);
    arbiter.request();
    arbiter.on_external_loss();
    assert_eq!(arbiter.state(), FocusState::Released);

    arbiter.release();
    assert_eq!(arbiter.state(), FocusState::Released);
}

#[test]
fn provider_listener_drives_external_loss() {
    let captured: Arc<Mutex<Option<Arc<dyn FocusChangeListener>>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&captured);

    let mut provider = MockProvider::new();
    provider.expect_request_focus().returning(move |listener| {
        *slot.lock() = Some(listener);
        Ok(FocusResponse::Granted(FocusGrant::new(9)))
    });

    let arbiter = arbiter_with(provider);
    arbiter.request();

    let listener = captured.lock().clone().unwrap();
    listener.on_focus_change(FocusChange::LossTransientCanDuck);
    assert_eq!(arbiter.state(), FocusState::Held);
    listener.on_focus_change(FocusChange::Loss);
    assert_eq!(arbiter.state(), FocusState::Released);
}

#[test]
fn regains_focus_after_revocation() {
    let provider = Arc::new(LocalFocusProvider::new());
    let arbiter =
        FocusArbiter::new(CapabilitySlot::with(provider.clone() as Arc<dyn FocusProvider>));

    arbiter.request();
    assert!(provider.is_held());

    assert!(provider.revoke(FocusChange::LossTransient));
    assert_eq!(arbiter.state(), FocusState::Released);

    arbiter.request();
    assert_eq!(arbiter.state(), FocusState::Held);
    assert_eq!(provider.request_count(), 2);
    assert_eq!(provider.release_count(), 0);
}

#[test]
fn provider_installed_later_is_used() {
    let slot: CapabilitySlot<dyn FocusProvider> = CapabilitySlot::empty();
    let arbiter = FocusArbiter::new(slot.clone());

    arbiter.request();
    assert_eq!(arbiter.state(), FocusState::Released);

    let provider = Arc::new(LocalFocusProvider::new());
    slot.install(provider.clone());
    arbiter.request();
    assert_eq!(arbiter.state(), FocusState::Held);
    assert!(provider.is_held());
}

#[test]
fn external_loss_racing_request_and_release_stays_consistent() {
    const ROUNDS: usize = 500;

    let provider = Arc::new(LocalFocusProvider::new());
    let arbiter =
        FocusArbiter::new(CapabilitySlot::with(provider.clone() as Arc<dyn FocusProvider>));
    let barrier = Arc::new(Barrier::new(3));

    let requester = {
        let arbiter = arbiter.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            for round in 0..ROUNDS {
                arbiter.request();
                if round % 3 == 2 {
                    arbiter.release();
                }
            }
        })
    };
    let local_loss = {
        let arbiter = arbiter.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..ROUNDS {
                arbiter.on_external_loss();
            }
        })
    };
    let revoker = {
        let provider = provider.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..ROUNDS {
                provider.revoke(FocusChange::LossTransient);
            }
        })
    };
    for worker in [requester, local_loss, revoker] {
        worker.join().unwrap();
    }

    if arbiter.state() == FocusState::Held {
        assert!(provider.is_held());
    }

    arbiter.request();
    assert_eq!(arbiter.state(), FocusState::Held);
    assert!(provider.is_held());

    arbiter.release();
    assert_eq!(arbiter.state(), FocusState::Released);
    assert!(!provider.is_held());
}
