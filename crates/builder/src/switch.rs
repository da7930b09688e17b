//! Switch/case merge state machine.
//!
//! Consecutive labels without a body accumulate into one OR'd guard that
//! governs the first label that has one, so a fallthrough group renders as a
//! single guarded block.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeAction {
    Open(String),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Idle,
    /// At least one label seen since the last exit. `scope_open` is false
    /// while only empty-bodied labels have been seen.
    InCase { scope_open: bool },
}

/// How a `break` or `return` relates to the innermost switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseExit {
    /// At case-body level: the case ends here.
    Now,
    /// Nested in a branch of the case body: the case ends at the next label.
    Deferred,
    /// Targets an enclosing loop, or lies outside the case bodies.
    NotOwned,
}

#[derive(Debug, Clone)]
pub struct SwitchContext {
    switch_expr: String,
    condition: String,
    state: CaseState,
    loop_depth: usize,
    body_depth: usize,
    end_pending: bool,
}

impl SwitchContext {
    /// `loop_depth` and `body_depth` are the walker's nesting counters at the
    /// point the switch is entered; case bodies live at that level.
    pub fn new(switch_expr: impl Into<String>, loop_depth: usize, body_depth: usize) -> Self {
        Self {
            switch_expr: switch_expr.into(),
            condition: String::new(),
            state: CaseState::Idle,
            loop_depth,
            body_depth,
            end_pending: false,
        }
    }

    pub fn state(&self) -> CaseState {
        self.state
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn start_case(&mut self, label: &str, has_body: bool) -> Vec<ScopeAction> {
        let term = format!("{} == {}", self.switch_expr, label);
        let mut actions = Vec::new();
        if self.end_pending {
            actions.extend(self.end_case());
        }
        match self.state {
            CaseState::Idle => self.condition = term,
            CaseState::InCase { scope_open } => {
                self.condition.push_str(" || ");
                self.condition.push_str(&term);
                if scope_open && has_body {
                    actions.push(ScopeAction::Close);
                }
            }
        }
        let was_open = matches!(self.state, CaseState::InCase { scope_open: true });
        if has_body {
            actions.push(ScopeAction::Open(format!("[{}]", self.condition)));
        }
        self.state = CaseState::InCase {
            scope_open: has_body || was_open,
        };
        actions
    }

    /// Called on break, return or the end of the switch.
    pub fn end_case(&mut self) -> Option<ScopeAction> {
        let action = match self.state {
            CaseState::InCase { scope_open: true } => Some(ScopeAction::Close),
            _ => None,
        };
        self.state = CaseState::Idle;
        self.end_pending = false;
        action
    }

    /// Records an exit from a nested branch of the current case. The guard
    /// is closed when the next label starts, not here.
    pub fn defer_end(&mut self) {
        if matches!(self.state, CaseState::InCase { .. }) {
            self.end_pending = true;
        }
    }

    /// Classifies a `break` (or `return`) seen at the given nesting. A break
    /// inside a loop targets the loop instead.
    pub fn exit_at(&self, depth: usize, loop_depth: usize, is_break: bool) -> CaseExit {
        if is_break && loop_depth != self.loop_depth {
            return CaseExit::NotOwned;
        }
        match depth.cmp(&self.body_depth) {
            std::cmp::Ordering::Equal => CaseExit::Now,
            std::cmp::Ordering::Greater => CaseExit::Deferred,
            std::cmp::Ordering::Less => CaseExit::NotOwned,
        }
    }
}
