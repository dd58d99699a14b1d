//! Property-based tests for the schema editor using proptest-state-machine.
//!
//! Random sequences of editor actions (start add/edit, buffer mutation,
//! commit, remove, cancel) run against both the real `SchemaEditor` and an
//! independently written reference model of the same semantics. After every
//! step the two must agree on the field set and editing state, and the
//! committed set must uphold its invariants: unique non-blank names and
//! non-empty options on every select field.

use proptest::prelude::*;
use proptest_state_machine::{ReferenceStateMachine, StateMachineTest};

use muster_api::{build_options, join_options, FieldSchema, FieldType};

use crate::editor::{EditTarget, SchemaEditor};

/// Reference buffer: what the input row should contain while editing.
#[derive(Debug, Clone, PartialEq)]
pub struct RefBuffer {
    name: String,
    field_type: FieldType,
    required: bool,
    options_input: String,
    /// `None` while adding a new field, `Some(index)` while editing in place.
    target: Option<usize>,
}

impl RefBuffer {
    fn blank(target: Option<usize>) -> Self {
        Self {
            name: String::new(),
            field_type: FieldType::Text,
            required: false,
            options_input: String::new(),
            target,
        }
    }
}

/// Reference model: the editor semantics implemented independently.
#[derive(Debug, Clone, Default)]
pub struct RefEditor {
    fields: Vec<FieldSchema>,
    buffer: Option<RefBuffer>,
}

#[derive(Clone, Debug)]
pub enum EditorTransition {
    StartAdd,
    StartEdit(usize),
    SetName(String),
    SetType(FieldType),
    SetRequired(bool),
    SetOptions(String),
    Commit,
    Remove(usize),
    Cancel,
}

fn apply_to_reference(mut state: RefEditor, transition: &EditorTransition) -> RefEditor {
    match transition {
        EditorTransition::StartAdd => {
            state.buffer = Some(RefBuffer::blank(None));
        }
        EditorTransition::StartEdit(index) => {
            if let Some(field) = state.fields.get(*index) {
                state.buffer = Some(RefBuffer {
                    name: field.name.clone(),
                    field_type: field.field_type,
                    required: field.required,
                    options_input: join_options(&field.options),
                    target: Some(*index),
                });
            }
        }
        EditorTransition::SetName(name) => {
            if let Some(buffer) = state.buffer.as_mut() {
                buffer.name = name.clone();
            }
        }
        EditorTransition::SetType(field_type) => {
            if let Some(buffer) = state.buffer.as_mut() {
                buffer.field_type = *field_type;
            }
        }
        EditorTransition::SetRequired(required) => {
            if let Some(buffer) = state.buffer.as_mut() {
                buffer.required = *required;
            }
        }
        EditorTransition::SetOptions(options) => {
            if let Some(buffer) = state.buffer.as_mut() {
                buffer.options_input = options.clone();
            }
        }
        EditorTransition::Commit => {
            let Some(buffer) = state.buffer.clone() else {
                return state;
            };
            let name = buffer.name.trim().to_string();
            if name.is_empty() {
                return state;
            }
            let duplicate = state
                .fields
                .iter()
                .enumerate()
                .any(|(i, f)| f.name == name && buffer.target != Some(i));
            if duplicate {
                return state;
            }
            let options = if buffer.field_type == FieldType::Select {
                let options = build_options(&buffer.options_input);
                if options.is_empty() {
                    return state;
                }
                options
            } else {
                Vec::new()
            };
            let field = FieldSchema {
                name,
                field_type: buffer.field_type,
                required: buffer.required,
                options,
            };
            match buffer.target {
                Some(index) => state.fields[index] = field,
                None => state.fields.push(field),
            }
            state.buffer = None;
        }
        EditorTransition::Remove(index) => {
            if *index < state.fields.len() {
                state.fields.remove(*index);
                state.buffer = match state.buffer.take() {
                    Some(RefBuffer {
                        target: Some(editing),
                        ..
                    }) if editing == *index => None,
                    Some(mut buffer) => {
                        if let Some(editing) = buffer.target {
                            if editing > *index {
                                buffer.target = Some(editing - 1);
                            }
                        }
                        Some(buffer)
                    }
                    None => None,
                };
            }
        }
        EditorTransition::Cancel => {
            state.buffer = None;
        }
    }
    state
}

fn generate_transitions(state: &RefEditor) -> BoxedStrategy<EditorTransition> {
    // A small pool of names makes duplicate collisions likely; blanks
    // exercise the empty-name rejection.
    let names = prop::sample::select(vec!["Team Name", "Age", "Tier", "a", "b", " ", ""])
        .prop_map(|name| EditorTransition::SetName(name.to_string()))
        .boxed();
    let types = prop::sample::select(vec![
        FieldType::Text,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Select,
    ])
    .prop_map(EditorTransition::SetType)
    .boxed();
    let required = any::<bool>().prop_map(EditorTransition::SetRequired).boxed();
    let options = prop::sample::select(vec!["", "Gold, Silver, Bronze", "x,,y", " , "])
        .prop_map(|options| EditorTransition::SetOptions(options.to_string()))
        .boxed();
    let start_add = Just(EditorTransition::StartAdd).boxed();
    let commit = Just(EditorTransition::Commit).boxed();
    let cancel = Just(EditorTransition::Cancel).boxed();

    let mut strategies = vec![
        (3u32, start_add),
        (4, names),
        (3, types),
        (2, required),
        (3, options),
        (5, commit),
        (1, cancel),
    ];

    if !state.fields.is_empty() {
        // Indices reach one past the end so stale-index handling is hit too.
        let bound = state.fields.len() + 1;
        strategies.push((
            3,
            (0..bound).prop_map(EditorTransition::StartEdit).boxed(),
        ));
        strategies.push((2, (0..bound).prop_map(EditorTransition::Remove).boxed()));
    }

    prop::strategy::Union::new_weighted(strategies).boxed()
}

impl ReferenceStateMachine for RefEditor {
    type State = Self;
    type Transition = EditorTransition;

    fn init_state() -> BoxedStrategy<Self::State> {
        Just(RefEditor::default()).boxed()
    }

    fn transitions(state: &Self::State) -> BoxedStrategy<Self::Transition> {
        generate_transitions(state)
    }

    fn apply(state: Self::State, transition: &Self::Transition) -> Self::State {
        apply_to_reference(state, transition)
    }
}

impl StateMachineTest for SchemaEditor {
    type SystemUnderTest = Self;
    type Reference = RefEditor;

    fn init_test(
        _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
    ) -> Self::SystemUnderTest {
        SchemaEditor::new()
    }

    fn apply(
        mut state: Self::SystemUnderTest,
        _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        transition: <Self::Reference as ReferenceStateMachine>::Transition,
    ) -> Self::SystemUnderTest {
        match &transition {
            EditorTransition::StartAdd => state.start_add(),
            EditorTransition::StartEdit(index) => {
                state.start_edit(*index);
            }
            EditorTransition::SetName(name) => state.buffer_mut().name = name.clone(),
            EditorTransition::SetType(field_type) => {
                state.buffer_mut().field_type = *field_type;
            }
            EditorTransition::SetRequired(required) => {
                state.buffer_mut().required = *required;
            }
            EditorTransition::SetOptions(options) => {
                state.buffer_mut().options_input = options.clone();
            }
            // Rejections are part of the modelled behavior: the reference
            // keeps its state on failure and the comparison below confirms
            // the editor did too.
            EditorTransition::Commit => {
                let _ = state.commit();
            }
            EditorTransition::Remove(index) => {
                state.remove(*index);
            }
            EditorTransition::Cancel => state.cancel(),
        }
        state
    }

    fn check_invariants(
        state: &Self::SystemUnderTest,
        ref_state: &<Self::Reference as ReferenceStateMachine>::State,
    ) {
        assert_eq!(state.fields(), ref_state.fields.as_slice());

        let expected_target = ref_state.buffer.as_ref().map(|b| match b.target {
            Some(index) => EditTarget::Existing(index),
            None => EditTarget::New,
        });
        assert_eq!(state.editing(), expected_target);

        if let Some(ref_buffer) = &ref_state.buffer {
            let buffer = state.buffer();
            assert_eq!(buffer.name, ref_buffer.name);
            assert_eq!(buffer.field_type, ref_buffer.field_type);
            assert_eq!(buffer.required, ref_buffer.required);
            assert_eq!(buffer.options_input, ref_buffer.options_input);
        }

        // Committed-set invariants hold no matter the action sequence.
        for (i, field) in state.fields().iter().enumerate() {
            assert!(!field.name.trim().is_empty(), "blank field name committed");
            assert!(
                !state.fields()[..i].iter().any(|f| f.name == field.name),
                "duplicate field name committed: {}",
                field.name
            );
            if field.field_type == FieldType::Select {
                assert!(
                    !field.options.is_empty(),
                    "select field {} committed without options",
                    field.name
                );
            } else {
                assert!(field.options.is_empty());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest_state_machine::prop_state_machine! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            .. ProptestConfig::default()
        })]

        #[test]
        fn test_editor_matches_reference_model(sequential 1..30 => SchemaEditor);
    }
}
