//! End-to-end booking flow tests
//!
//! Runs whole bookings through the wizard session and the simulation
//! driver with the built-in simulated payment processor.

use chrono::Weekday;
use std::sync::Arc;
use std::time::Duration;

use tutranquilo::flow::BookingDraft;
use tutranquilo::payment::PaymentRequest;
use tutranquilo::status::Settlement;
use tutranquilo::{
    BookingError, BookingSession, BookingSimulation, ContactInfo, ExtraFeeChoice, FlowError,
    PaymentMethod, PaymentPurpose, PaymentReceipt, ProblemDetails, ServiceRoute,
    SimulatedGateway, SimulationError, SimulationOptions, StepInput, TuTranquiloConfig, UserType,
    WizardStep,
};

fn simulation() -> BookingSimulation {
    BookingSimulation::new(&TuTranquiloConfig::default())
        .with_gateway(Arc::new(SimulatedGateway::new(Duration::from_millis(2500))))
}

#[tokio::test(start_paused = true)]
async fn test_business_booking_on_site_with_paid_fee() {
    let options = SimulationOptions {
        user_type: UserType::Business,
        service_id: Some("soporte-m365".to_string()),
        route: Some(ServiceRoute::OnSite),
        method: PaymentMethod::PseCardsWompi,
        stars: Some(4),
        comment: "  Quick and tidy  ".to_string(),
        ..Default::default()
    };

    let report = simulation().run(&options).await.unwrap();

    assert_eq!(report.booking.request.service_id(), "soporte-m365");
    assert_eq!(report.booking.base_payment.amount_cop, 35_000);
    assert_eq!(report.booking.technician.id, "camilo-murcia");
    assert_eq!(report.final_snapshot.status.settlement(), Settlement::ExtraFeePaid);
    assert_eq!(report.extra_fee_attempts, 1);
    assert_eq!(report.booking.rating.comment(), "Quick and tidy");
}

#[tokio::test(start_paused = true)]
async fn test_home_booking_self_delivery_shows_drop_off() {
    let options = SimulationOptions {
        route: Some(ServiceRoute::DiagnosticCenter),
        choice: ExtraFeeChoice::SelfDelivery,
        ..Default::default()
    };

    let report = simulation().run(&options).await.unwrap();

    let drop_off = report.final_snapshot.drop_off.clone().unwrap();
    assert_eq!(drop_off.address, "Calle 123 #45-67, Edificio Tech, Cali.");
    assert_eq!(drop_off.ticket, "#ST-9921");
    assert!(!report.final_snapshot.extra_fee_paid);
}

#[tokio::test(start_paused = true)]
async fn test_self_delivery_falls_back_to_paying_on_site() {
    let options = SimulationOptions {
        route: Some(ServiceRoute::OnSite),
        choice: ExtraFeeChoice::SelfDelivery,
        ..Default::default()
    };

    let report = simulation().run(&options).await.unwrap();
    assert_eq!(report.final_snapshot.status.settlement(), Settlement::ExtraFeePaid);
}

#[tokio::test(start_paused = true)]
async fn test_preferred_time_outside_hours_stops_at_problem_step() {
    let options = SimulationOptions {
        preferred_day: Some(Weekday::Sat),
        preferred_time: Some("16:00".to_string()),
        ..Default::default()
    };

    let err = simulation().run(&options).await.unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Flow(FlowError::Booking(BookingError::TimeOutsideWindow { .. }))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_declining_processor_fails_base_payment() {
    let simulation = BookingSimulation::new(&TuTranquiloConfig::default()).with_gateway(Arc::new(
        SimulatedGateway::new(Duration::from_millis(10)).with_decline_rate(1.0),
    ));

    let err = simulation.run(&SimulationOptions::default()).await.unwrap_err();
    assert!(matches!(err, SimulationError::BasePaymentFailed { attempts: 3, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_time_scale_shortens_the_flow() {
    let options = SimulationOptions {
        route: Some(ServiceRoute::Remote),
        time_scale: 0.0,
        ..Default::default()
    };
    let simulation = BookingSimulation::new(&TuTranquiloConfig::default())
        .with_gateway(Arc::new(SimulatedGateway::new(Duration::ZERO)));

    let started = tokio::time::Instant::now();
    simulation.run(&options).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_manual_session_back_and_forth() {
    let mut session = BookingSession::new();
    assert_eq!(session.continue_with(StepInput::Start).unwrap(), WizardStep::UserTypeSelection);
    session.continue_with(StepInput::UserType(UserType::Home)).unwrap();
    session
        .continue_with(StepInput::Service("diagnostico-tecnico-hogar".to_string()))
        .unwrap();
    session
        .continue_with(StepInput::Problem(ProblemDetails::new(
            "Fan is noisy",
            "Cra 100 #11-60",
        )))
        .unwrap();
    assert_eq!(session.step(), WizardStep::ServiceModality);
    assert_eq!(session.step().progress_label().unwrap(), "Step 4 of 10");

    assert_eq!(session.back().unwrap(), WizardStep::ProblemDescription);
    assert_eq!(
        session.continue_with(StepInput::AcknowledgeModality),
        Err(FlowError::UnexpectedInput {
            step: WizardStep::ProblemDescription,
            input: "acknowledge_modality"
        })
    );

    let summary = session.summary().unwrap();
    assert_eq!(summary.service_name, "Diagnostico tecnico hogar");
    assert_eq!(summary.user_type_label, "Home");
}

#[test]
fn test_contact_step_freezes_request() {
    let mut session = BookingSession::new();
    session.continue_with(StepInput::Start).unwrap();
    session.continue_with(StepInput::UserType(UserType::Home)).unwrap();
    session
        .continue_with(StepInput::Service("mantenimiento-preventivo-hogar".to_string()))
        .unwrap();
    session
        .continue_with(StepInput::Problem(ProblemDetails::new("Slow", "Home")))
        .unwrap();
    session.continue_with(StepInput::AcknowledgeModality).unwrap();
    session.continue_with(StepInput::ConfirmSummary).unwrap();

    let receipt = PaymentReceipt::for_request(&PaymentRequest::new(
        PaymentPurpose::BaseDiagnostic,
        PaymentMethod::default(),
    ));
    session.continue_with(StepInput::BasePaid(receipt)).unwrap();
    session
        .continue_with(StepInput::Contact(ContactInfo::new("Luis", "3109876543")))
        .unwrap();
    assert_eq!(session.step(), WizardStep::TechnicianAssignment);
    assert!(session.draft() != &BookingDraft::default());
    assert_eq!(
        session.draft().request.as_ref().unwrap().contact().phone,
        "3109876543"
    );
}
