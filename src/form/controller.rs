// ABOUTME: Rollback button controller for the run document's detail form.
// ABOUTME: Gates the button on Completed status and delegates the click to a remote call.

use crate::rpc::{CallError, RemoteCall};
use crate::update::RunStatus;

use super::document::Document;
use super::view::{FormAction, FormView};

/// Remote procedure invoked when the rollback button is clicked.
pub const ROLLBACK_METHOD: &str = "rollback_changes";

/// Label of the rollback button.
pub const ROLLBACK_BUTTON_LABEL: &str = "Rollback Changes";

/// Refresh hook: invoked by the host whenever the detail view is (re)drawn.
///
/// Registers the rollback button if and only if the document's status is
/// exactly `Completed` at this refresh. Visibility is recomputed per
/// refresh, never tracked.
pub fn refresh<V: FormView>(view: &mut V, doc: &Document) {
    if doc.status() == Some(RunStatus::Completed.as_str()) {
        view.add_custom_button(ROLLBACK_BUTTON_LABEL, FormAction::RollbackChanges);
    }
}

/// Click handler for the rollback button.
///
/// Issues exactly one remote call and displays the response message when
/// the server returned one. Transport and server errors are handed back
/// to the host dispatcher unshown; surfacing them is the host's job.
pub async fn rollback_clicked<T, V>(
    transport: &T,
    view: &V,
    doc: &Document,
) -> Result<(), CallError>
where
    T: RemoteCall + ?Sized,
    V: FormView,
{
    let response = transport.call(ROLLBACK_METHOD, doc).await?;

    if let Some(message) = response.display_message() {
        view.msgprint(&message);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::CallResponse;
    use crate::types::{DocId, DocTypeName};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingView {
        buttons: Vec<(String, FormAction)>,
        prompts: Mutex<Vec<String>>,
    }

    impl FormView for RecordingView {
        fn add_custom_button(&mut self, label: &str, action: FormAction) {
            self.buttons.push((label.to_string(), action));
        }

        fn msgprint(&self, message: &str) {
            self.prompts.lock().unwrap().push(message.to_string());
        }
    }

    struct StubTransport {
        response: CallResponse,
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl StubTransport {
        fn returning(message: Option<Value>) -> Self {
            Self {
                response: CallResponse { message },
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RemoteCall for StubTransport {
        async fn call(&self, method: &str, doc: &Document) -> Result<CallResponse, CallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((method.to_string(), doc.name.to_string()));
            Ok(self.response.clone())
        }
    }

    fn run_doc(status: &str) -> Document {
        let mut doc = Document::new(
            DocTypeName::new("Data Update Run").unwrap(),
            DocId::new("customer-20250101120000-42"),
        );
        doc.set("status", Value::String(status.to_string()));
        doc
    }

    #[test]
    fn refresh_registers_button_for_completed() {
        let mut view = RecordingView::default();
        refresh(&mut view, &run_doc("Completed"));
        assert_eq!(
            view.buttons,
            vec![(
                "Rollback Changes".to_string(),
                FormAction::RollbackChanges
            )]
        );
    }

    #[test]
    fn refresh_skips_button_for_other_statuses() {
        for status in ["Draft", "Pending", "Rolled Back", "completed", ""] {
            let mut view = RecordingView::default();
            refresh(&mut view, &run_doc(status));
            assert!(view.buttons.is_empty(), "unexpected button for {status:?}");
        }
    }

    #[test]
    fn refresh_skips_button_when_status_unset() {
        let mut view = RecordingView::default();
        let doc = Document::new(
            DocTypeName::new("Data Update Run").unwrap(),
            DocId::new("run-1"),
        );
        refresh(&mut view, &doc);
        assert!(view.buttons.is_empty());
    }

    #[tokio::test]
    async fn click_issues_exactly_one_call_and_prompts_message() {
        let transport = StubTransport::returning(Some(Value::String("Undone".to_string())));
        let view = RecordingView::default();

        rollback_clicked(&transport, &view, &run_doc("Completed"))
            .await
            .unwrap();

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *transport.seen.lock().unwrap(),
            vec![(
                "rollback_changes".to_string(),
                "customer-20250101120000-42".to_string()
            )]
        );
        assert_eq!(*view.prompts.lock().unwrap(), vec!["Undone".to_string()]);
    }

    #[tokio::test]
    async fn click_with_empty_message_shows_nothing() {
        for message in [None, Some(Value::String(String::new())), Some(Value::Null)] {
            let transport = StubTransport::returning(message);
            let view = RecordingView::default();

            rollback_clicked(&transport, &view, &run_doc("Completed"))
                .await
                .unwrap();

            assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
            assert!(view.prompts.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn click_propagates_transport_error_without_prompting() {
        struct FailingTransport;

        #[async_trait]
        impl RemoteCall for FailingTransport {
            async fn call(&self, _: &str, _: &Document) -> Result<CallResponse, CallError> {
                Err(CallError::Transport("connection reset".to_string()))
            }
        }

        let view = RecordingView::default();
        let err = rollback_clicked(&FailingTransport, &view, &run_doc("Completed"))
            .await
            .unwrap_err();

        assert!(matches!(err, CallError::Transport(_)));
        assert!(view.prompts.lock().unwrap().is_empty());
    }
}
