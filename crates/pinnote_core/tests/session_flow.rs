use pinnote_core::auth::IdentityListener;
use pinnote_core::store::{NoteQuery, SnapshotListener, SubscriptionId};
use pinnote_core::{
    AuthError, AuthForm, AuthGateway, AuthMode, AuthResult, DocumentStore, Identity,
    IdentitySubscription, MemoryDocumentStore, NewNote, NoteId, NotePatch, NotesController,
    OAuthProvider, Session, StoreResult,
};
use std::sync::{Arc, Mutex};

const PASSWORD: &str = "correct horse";

#[derive(Default)]
struct GatewayState {
    identity: Option<Identity>,
    listeners: Vec<(u64, IdentityListener)>,
    next_listener: u64,
    calls: Vec<String>,
}

/// In-process identity provider that notifies listeners synchronously.
#[derive(Default)]
struct FakeGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl FakeGateway {
    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn listener_count(&self) -> usize {
        self.state.lock().unwrap().listeners.len()
    }

    fn record(&self, call: &str) {
        self.state.lock().unwrap().calls.push(call.to_string());
    }

    fn set_identity(&self, identity: Option<Identity>) {
        let listeners: Vec<IdentityListener> = {
            let mut state = self.state.lock().unwrap();
            state.identity = identity.clone();
            state.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in listeners {
            listener(identity.clone());
        }
    }

    fn check(&self, email: &str, password: &str) -> AuthResult<Identity> {
        if password != PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }
        let identity = Identity::new(format!("uid-{email}"), email);
        self.set_identity(Some(identity.clone()));
        Ok(identity)
    }
}

impl AuthGateway for FakeGateway {
    fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        self.record("sign_in");
        self.check(email, password)
    }

    fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity> {
        self.record("sign_up");
        self.check(email, password)
    }

    fn set_display_name(&self, name: &str) -> AuthResult<Identity> {
        self.record("set_display_name");
        let mut state = self.state.lock().unwrap();
        let identity = state
            .identity
            .as_mut()
            .ok_or_else(|| AuthError::Gateway("no signed-in user".to_string()))?;
        identity.display_name = Some(name.to_string());
        Ok(identity.clone())
    }

    fn sign_in_with_popup(&self, provider: OAuthProvider) -> AuthResult<Identity> {
        self.record(provider.id());
        let identity = Identity::new("google-user", "g@example.com");
        self.set_identity(Some(identity.clone()));
        Ok(identity)
    }

    fn sign_out(&self) -> AuthResult<()> {
        self.record("sign_out");
        self.set_identity(None);
        Ok(())
    }

    fn on_identity_change(&self, listener: IdentityListener) -> IdentitySubscription {
        let (id, current) = {
            let mut state = self.state.lock().unwrap();
            state.next_listener += 1;
            let id = state.next_listener;
            state.listeners.push((id, Arc::clone(&listener)));
            (id, state.identity.clone())
        };
        listener(current);

        let registry = Arc::clone(&self.state);
        IdentitySubscription::new(move || {
            registry
                .lock()
                .unwrap()
                .listeners
                .retain(|(entry, _)| *entry != id);
        })
    }
}

/// Memory store that logs subscription lifecycle events in order.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryDocumentStore,
    events: Mutex<Vec<String>>,
}

impl RecordingStore {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl DocumentStore for RecordingStore {
    fn collection(&self) -> &str {
        self.inner.collection()
    }

    fn subscribe(
        &self,
        query: NoteQuery,
        listener: SnapshotListener,
    ) -> StoreResult<SubscriptionId> {
        self.events
            .lock()
            .unwrap()
            .push(format!("subscribe:{}", query.owner_id));
        self.inner.subscribe(query, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.events.lock().unwrap().push("unsubscribe".to_string());
        self.inner.unsubscribe(id)
    }

    fn create(&self, note: NewNote) -> StoreResult<NoteId> {
        self.inner.create(note)
    }

    fn update(&self, id: &NoteId, patch: NotePatch) -> StoreResult<()> {
        self.inner.update(id, patch)
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        self.inner.delete(id)
    }

    fn batch_create(&self, notes: Vec<NewNote>) -> StoreResult<Vec<NoteId>> {
        self.inner.batch_create(notes)
    }
}

struct Fixture {
    gateway: Arc<FakeGateway>,
    store: Arc<RecordingStore>,
    session: Session<FakeGateway, RecordingStore>,
}

fn fixture() -> Fixture {
    let gateway = Arc::new(FakeGateway::default());
    let store = Arc::new(RecordingStore::default());
    let controller = Arc::new(NotesController::new(Arc::clone(&store)));
    let session = Session::new(Arc::clone(&gateway), controller);
    Fixture {
        gateway,
        store,
        session,
    }
}

#[test]
fn loading_until_first_identity_callback() {
    let f = fixture();
    assert!(f.session.status().loading);

    f.session.attach();
    let status = f.session.status();
    assert!(!status.loading);
    assert!(status.identity.is_none());
    assert!(f.store.events().is_empty());
}

#[test]
fn sign_in_subscribes_to_owner_notes() {
    let f = fixture();
    f.session.attach();

    f.gateway.sign_in("a@example.com", PASSWORD).unwrap();

    assert_eq!(f.store.events(), vec!["subscribe:uid-a@example.com"]);
    let status = f.session.status();
    assert_eq!(
        status.identity.map(|identity| identity.id),
        Some("uid-a@example.com".to_string())
    );
    assert!(f.session.controller().is_subscribed());
}

#[test]
fn switching_identity_unsubscribes_before_resubscribing() {
    let f = fixture();
    f.session.attach();
    f.gateway.sign_in("a@example.com", PASSWORD).unwrap();
    f.session
        .controller()
        .create_note("private to a", "")
        .unwrap();

    f.gateway.sign_in("b@example.com", PASSWORD).unwrap();

    assert_eq!(
        f.store.events(),
        vec![
            "subscribe:uid-a@example.com",
            "unsubscribe",
            "subscribe:uid-b@example.com",
        ]
    );
    assert!(f.session.controller().notes().is_empty());
    assert_eq!(f.store.inner.subscriber_count(), 1);
}

#[test]
fn sign_out_stops_subscription_before_gateway_call() {
    let f = fixture();
    f.session.attach();
    f.gateway.sign_in("a@example.com", PASSWORD).unwrap();
    f.session.controller().create_note("todo", "").unwrap();

    f.session.sign_out().unwrap();

    assert_eq!(
        f.store.events(),
        vec!["subscribe:uid-a@example.com", "unsubscribe"]
    );
    assert_eq!(f.gateway.calls(), vec!["sign_in", "sign_out"]);
    assert!(f.session.controller().identity().is_none());
    assert!(f.session.controller().notes().is_empty());
    assert!(f.session.status().identity.is_none());
}

#[test]
fn detach_and_drop_release_gateway_listener() {
    let f = fixture();
    f.session.attach();
    assert_eq!(f.gateway.listener_count(), 1);
    f.session.attach();
    assert_eq!(f.gateway.listener_count(), 1);

    f.session.detach();
    assert_eq!(f.gateway.listener_count(), 0);

    f.session.attach();
    let gateway = Arc::clone(&f.gateway);
    drop(f);
    assert_eq!(gateway.listener_count(), 0);
}

#[test]
fn sign_up_rejects_mismatched_passwords_without_gateway_call() {
    let gateway = FakeGateway::default();
    let mut form = AuthForm::new(AuthMode::SignUp);
    form.email = "new@example.com".to_string();
    form.password = PASSWORD.to_string();
    form.confirm_password = "something else".to_string();

    let err = form.submit(&gateway).unwrap_err();
    assert_eq!(err, AuthError::PasswordMismatch);
    assert_eq!(form.error(), Some("Passwords don't match"));
    assert!(gateway.calls().is_empty());
}

#[test]
fn sign_up_sets_display_name_when_given() {
    let gateway = FakeGateway::default();
    let mut form = AuthForm::new(AuthMode::SignUp);
    form.email = "new@example.com".to_string();
    form.password = PASSWORD.to_string();
    form.confirm_password = PASSWORD.to_string();
    form.display_name = "  Ada  ".to_string();

    let identity = form.submit(&gateway).unwrap();
    assert_eq!(identity.display_name.as_deref(), Some("Ada"));
    assert_eq!(identity.label(), "Ada");
    assert_eq!(gateway.calls(), vec!["sign_up", "set_display_name"]);
    assert!(form.password.is_empty());
    assert!(form.error().is_none());
}

#[test]
fn failed_sign_in_keeps_input_and_shows_error() {
    let gateway = FakeGateway::default();
    let mut form = AuthForm::default();
    form.email = "a@example.com".to_string();
    form.password = "wrong".to_string();

    assert_eq!(form.submit(&gateway), Err(AuthError::InvalidCredentials));
    assert_eq!(form.error(), Some("The email or password is incorrect."));
    assert_eq!(form.password, "wrong");

    form.toggle_mode();
    assert_eq!(form.mode, AuthMode::SignUp);
    assert!(form.error().is_none());
}

#[test]
fn popup_sign_in_flows_into_session() {
    let f = fixture();
    f.session.attach();
    let mut form = AuthForm::default();

    let identity = form
        .sign_in_with_provider(&*f.gateway, OAuthProvider::Google)
        .unwrap();
    assert_eq!(identity.id, "google-user");
    assert_eq!(f.gateway.calls(), vec!["google.com"]);
    assert_eq!(f.store.events(), vec!["subscribe:google-user"]);
}
