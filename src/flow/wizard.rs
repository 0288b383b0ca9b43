use serde::{Deserialize, Serialize};
use statig::prelude::*;
use std::fmt;

/// Screens of the booking wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Welcome,
    UserTypeSelection,
    ServiceSelection,
    ProblemDescription,
    ServiceModality,
    ServiceSummary,
    Payment,
    ContactInfo,
    TechnicianAssignment,
    ServiceStatus,
    Rating,
}

impl WizardStep {
    /// Numbered steps after the welcome screen
    pub const TOTAL_STEPS: u8 = 10;

    /// Position shown in the progress header, `None` on the welcome screen
    pub fn step_number(&self) -> Option<u8> {
        let n = match self {
            WizardStep::Welcome => return None,
            WizardStep::UserTypeSelection => 1,
            WizardStep::ServiceSelection => 2,
            WizardStep::ProblemDescription => 3,
            WizardStep::ServiceModality => 4,
            WizardStep::ServiceSummary => 5,
            WizardStep::Payment => 6,
            WizardStep::ContactInfo => 7,
            WizardStep::TechnicianAssignment => 8,
            WizardStep::ServiceStatus => 9,
            WizardStep::Rating => 10,
        };
        Some(n)
    }

    pub fn progress_label(&self) -> Option<String> {
        self.step_number()
            .map(|n| format!("Step {} of {}", n, Self::TOTAL_STEPS))
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Welcome => "Welcome",
            WizardStep::UserTypeSelection => "Who is the service for?",
            WizardStep::ServiceSelection => "Pick a service",
            WizardStep::ProblemDescription => "Describe the problem",
            WizardStep::ServiceModality => "How we work",
            WizardStep::ServiceSummary => "Service summary",
            WizardStep::Payment => "Payment",
            WizardStep::ContactInfo => "Contact details",
            WizardStep::TechnicianAssignment => "Technician assignment",
            WizardStep::ServiceStatus => "Service status",
            WizardStep::Rating => "Rate the service",
        }
    }

    /// Whether the back action leaves this screen
    pub fn can_go_back(&self) -> bool {
        !matches!(self, WizardStep::Welcome | WizardStep::Rating)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardEvent {
    Continue,
    Back,
}

/// Screen-to-screen navigation. Knows nothing about the data entered.
#[derive(Debug)]
pub struct WizardFlow {
    step: WizardStep,
    transitions: u32,
}

impl Default for WizardFlow {
    fn default() -> Self {
        Self {
            step: WizardStep::Welcome,
            transitions: 0,
        }
    }
}

impl WizardFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Number of screen changes since the wizard was created
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    fn move_to(&mut self, to: WizardStep, target: State) -> Outcome<State> {
        tracing::debug!(from = %self.step, to = %to, "Wizard step changed");
        self.step = to;
        self.transitions += 1;
        Transition(target)
    }
}

#[state_machine(initial = "State::welcome()")]
impl WizardFlow {
    #[state]
    fn welcome(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => {
                self.move_to(WizardStep::UserTypeSelection, State::user_type_selection())
            }
            WizardEvent::Back => Handled,
        }
    }

    #[state]
    fn user_type_selection(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => {
                self.move_to(WizardStep::ServiceSelection, State::service_selection())
            }
            WizardEvent::Back => self.move_to(WizardStep::Welcome, State::welcome()),
        }
    }

    #[state]
    fn service_selection(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => {
                self.move_to(WizardStep::ProblemDescription, State::problem_description())
            }
            WizardEvent::Back => {
                self.move_to(WizardStep::UserTypeSelection, State::user_type_selection())
            }
        }
    }

    #[state]
    fn problem_description(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => {
                self.move_to(WizardStep::ServiceModality, State::service_modality())
            }
            WizardEvent::Back => {
                self.move_to(WizardStep::ServiceSelection, State::service_selection())
            }
        }
    }

    #[state]
    fn service_modality(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => {
                self.move_to(WizardStep::ServiceSummary, State::service_summary())
            }
            WizardEvent::Back => {
                self.move_to(WizardStep::ProblemDescription, State::problem_description())
            }
        }
    }

    #[state]
    fn service_summary(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => self.move_to(WizardStep::Payment, State::payment()),
            WizardEvent::Back => {
                self.move_to(WizardStep::ServiceModality, State::service_modality())
            }
        }
    }

    #[state]
    fn payment(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => self.move_to(WizardStep::ContactInfo, State::contact_info()),
            WizardEvent::Back => {
                self.move_to(WizardStep::ServiceSummary, State::service_summary())
            }
        }
    }

    #[state]
    fn contact_info(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => self.move_to(
                WizardStep::TechnicianAssignment,
                State::technician_assignment(),
            ),
            WizardEvent::Back => self.move_to(WizardStep::Payment, State::payment()),
        }
    }

    #[state]
    fn technician_assignment(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => {
                self.move_to(WizardStep::ServiceStatus, State::service_status())
            }
            WizardEvent::Back => self.move_to(WizardStep::ContactInfo, State::contact_info()),
        }
    }

    #[state]
    fn service_status(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            WizardEvent::Continue => self.move_to(WizardStep::Rating, State::rating()),
            WizardEvent::Back => self.move_to(
                WizardStep::TechnicianAssignment,
                State::technician_assignment(),
            ),
        }
    }

    #[state]
    fn rating(&mut self, event: &WizardEvent) -> Outcome<State> {
        match event {
            // Finishing clears the back stack
            WizardEvent::Continue => self.move_to(WizardStep::Welcome, State::welcome()),
            WizardEvent::Back => Handled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(sm: &mut StateMachine<WizardFlow>, events: &[WizardEvent]) -> WizardStep {
        for event in events {
            sm.handle(event);
        }
        sm.inner().step()
    }

    #[test]
    fn test_full_forward_walk_returns_to_welcome() {
        let mut sm = WizardFlow::new().state_machine();
        let mut seen = vec![sm.inner().step()];
        for _ in 0..11 {
            sm.handle(&WizardEvent::Continue);
            seen.push(sm.inner().step());
        }

        assert_eq!(seen[1], WizardStep::UserTypeSelection);
        assert_eq!(seen[10], WizardStep::Rating);
        assert_eq!(seen[11], WizardStep::Welcome);
        assert_eq!(sm.inner().transitions(), 11);
    }

    #[test]
    fn test_back_walks_one_step() {
        let mut sm = WizardFlow::new().state_machine();
        let step = drive(
            &mut sm,
            &[
                WizardEvent::Continue,
                WizardEvent::Continue,
                WizardEvent::Continue,
                WizardEvent::Back,
            ],
        );
        assert_eq!(step, WizardStep::ServiceSelection);
    }

    #[test]
    fn test_back_is_ignored_on_welcome_and_rating() {
        let mut sm = WizardFlow::new().state_machine();
        assert_eq!(drive(&mut sm, &[WizardEvent::Back]), WizardStep::Welcome);
        assert_eq!(sm.inner().transitions(), 0);

        let to_rating = [WizardEvent::Continue; 10];
        assert_eq!(drive(&mut sm, &to_rating), WizardStep::Rating);
        assert_eq!(drive(&mut sm, &[WizardEvent::Back]), WizardStep::Rating);
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(WizardStep::Welcome.step_number(), None);
        assert_eq!(WizardStep::UserTypeSelection.progress_label().unwrap(), "Step 1 of 10");
        assert_eq!(WizardStep::Rating.progress_label().unwrap(), "Step 10 of 10");
        assert!(!WizardStep::Rating.can_go_back());
        assert!(WizardStep::Payment.can_go_back());
    }
}
