//! Checkout and order confirmation handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use solestyle_core::checkout::{CheckoutForm, Field, OrderTotals, ValidationErrors};
use solestyle_core::{Cart, CartItem, Order, PaymentMethod};
use tower_sessions::Session;
use tracing::instrument;

use super::PageChrome;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, VisitorId};
use crate::services::checkout::{
    last_order_id, load_snapshot, place_order, remember_order, save_snapshot, take_snapshot,
};
use crate::state::AppState;

/// Summary line display data: `color | size | Qty: n`.
#[derive(Clone)]
pub struct SummaryItemView {
    pub name: String,
    pub image: String,
    pub details: String,
    pub line_total: String,
}

impl From<&CartItem> for SummaryItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.name.clone(),
            image: item.image.clone(),
            details: format!(
                "{} | {} | Qty: {}",
                item.color.as_deref().unwrap_or("Default"),
                item.size.as_deref().unwrap_or("Default"),
                item.quantity
            ),
            line_total: item.line_total().display(),
        }
    }
}

/// Totals block display data.
#[derive(Clone)]
pub struct TotalsView {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl From<&OrderTotals> for TotalsView {
    fn from(totals: &OrderTotals) -> Self {
        Self {
            subtotal: totals.subtotal.display(),
            shipping: totals.shipping_label(),
            tax: totals.tax.display(),
            total: totals.total.display(),
        }
    }
}

/// One text input of the checkout form.
#[derive(Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub autocomplete: &'static str,
    pub placeholder: &'static str,
    pub value: String,
    pub error: Option<&'static str>,
    pub autofocus: bool,
}

impl FieldView {
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        self.error.is_some()
    }
}

/// Input metadata: (label, type, autocomplete, placeholder).
const fn field_meta(field: Field) -> (&'static str, &'static str, &'static str, &'static str) {
    match field {
        Field::FirstName => ("First Name", "text", "given-name", ""),
        Field::LastName => ("Last Name", "text", "family-name", ""),
        Field::Email => ("Email", "email", "email", ""),
        Field::Phone => ("Phone", "tel", "tel", ""),
        Field::Address => ("Address", "text", "street-address", ""),
        Field::City => ("City", "text", "address-level2", ""),
        Field::State => ("State", "text", "address-level1", ""),
        Field::Zip => ("ZIP Code", "text", "postal-code", ""),
        Field::Country => ("Country", "text", "country-name", ""),
        Field::PaymentMethod => ("Payment Method", "radio", "off", ""),
        Field::CardName => ("Name on Card", "text", "cc-name", ""),
        Field::CardNumber => ("Card Number", "text", "cc-number", "1234 5678 9012 3456"),
        Field::Expiry => ("Expiry Date", "text", "cc-exp", "MM/YY"),
        Field::Cvv => ("CVV", "text", "cc-csc", "123"),
    }
}

/// The checkout form as rendered: values, errors and which payment group
/// is visible.
#[derive(Clone)]
pub struct CheckoutFormView {
    pub contact: Vec<FieldView>,
    pub shipping: Vec<FieldView>,
    pub card: Vec<FieldView>,
    pub payment_method: &'static str,
    pub payment_error: Option<&'static str>,
    pub payment_autofocus: bool,
    pub show_card: bool,
}

impl CheckoutFormView {
    /// Build the view for `form`, marking the fields in `errors`.
    #[must_use]
    pub fn new(form: &CheckoutForm, errors: &ValidationErrors) -> Self {
        let first_invalid = errors.first();
        let field = |field: Field| {
            let (label, input_type, autocomplete, placeholder) = field_meta(field);
            FieldView {
                name: field.name(),
                label,
                input_type,
                autocomplete,
                placeholder,
                value: form.value(field).to_owned(),
                error: errors.message(field),
                autofocus: first_invalid == Some(field),
            }
        };

        // Unknown or missing methods render with the card group selected,
        // matching the page's default radio.
        let method = form.selected_payment_method().unwrap_or_default();

        Self {
            contact: [Field::FirstName, Field::LastName, Field::Email, Field::Phone]
                .into_iter()
                .map(field)
                .collect(),
            shipping: [
                Field::Address,
                Field::City,
                Field::State,
                Field::Zip,
                Field::Country,
            ]
            .into_iter()
            .map(field)
            .collect(),
            card: [Field::CardName, Field::CardNumber, Field::Expiry, Field::Cvv]
                .into_iter()
                .map(field)
                .collect(),
            payment_method: method.as_str(),
            payment_error: errors.message(Field::PaymentMethod),
            payment_autofocus: first_invalid == Some(Field::PaymentMethod),
            show_card: method.requires_card(),
        }
    }

    #[must_use]
    pub fn is_selected(&self, method: &str) -> bool {
        self.payment_method == method
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub chrome: PageChrome,
    pub items: Vec<SummaryItemView>,
    pub totals: TotalsView,
    pub form: CheckoutFormView,
    pub error_count: usize,
}

impl CheckoutTemplate {
    fn new(
        chrome: PageChrome,
        snapshot: &Cart,
        form: &CheckoutForm,
        errors: &ValidationErrors,
    ) -> Self {
        Self {
            chrome,
            items: snapshot.items().iter().map(SummaryItemView::from).collect(),
            totals: TotalsView::from(&OrderTotals::for_cart(snapshot)),
            form: CheckoutFormView::new(form, errors),
            error_count: errors.len(),
        }
    }
}

/// Order display data for the confirmation page.
#[derive(Clone)]
pub struct OrderView {
    pub order_id: String,
    pub order_date: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address_lines: Vec<String>,
    pub items: Vec<SummaryItemView>,
    pub totals: TotalsView,
    pub payment_method: &'static str,
    pub payment_status: &'static str,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let address = &order.shipping_address;
        Self {
            order_id: order.order_id.to_string(),
            order_date: order.order_date.format("%B %-d, %Y").to_string(),
            customer_name: order.customer_info.full_name(),
            email: order.customer_info.email.to_string(),
            phone: order.customer_info.phone.clone(),
            address_lines: vec![
                address.address.clone(),
                format!("{}, {} {}", address.city, address.state, address.zip),
                address.country.clone(),
            ],
            items: order.items.iter().map(SummaryItemView::from).collect(),
            totals: TotalsView::from(&order.totals),
            payment_method: order.payment.method.label(),
            payment_status: order.payment.status.as_str(),
        }
    }
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub chrome: PageChrome,
    pub order: OrderView,
}

/// Display the order summary and checkout form.
///
/// Without a snapshot the summary is empty; the form still renders.
#[instrument(skip(state, session, nonce), fields(visitor = %visitor))]
pub async fn show(
    State(state): State<AppState>,
    visitor: VisitorId,
    session: Session,
    nonce: CspNonce,
) -> Result<CheckoutTemplate> {
    let snapshot = load_snapshot(&session).await.unwrap_or_default();
    let chrome = PageChrome::load(&state, &visitor, &session, nonce).await?;
    let form = CheckoutForm {
        payment_method: PaymentMethod::default().as_str().to_owned(),
        ..CheckoutForm::default()
    };

    Ok(CheckoutTemplate::new(
        chrome,
        &snapshot,
        &form,
        &ValidationErrors::default(),
    ))
}

/// Validate the form and place the order.
///
/// Rejected forms are re-rendered with `422 Unprocessable Entity` and
/// nothing is stored.
#[instrument(skip(state, session, nonce, form), fields(visitor = %visitor))]
pub async fn submit(
    State(state): State<AppState>,
    visitor: VisitorId,
    session: Session,
    nonce: CspNonce,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let Some(snapshot) = load_snapshot(&session).await.filter(|cart| !cart.is_empty()) else {
        tracing::info!("Checkout submitted without a cart snapshot");
        return Ok(Redirect::to("/cart").into_response());
    };

    let checkout = match form.validate() {
        Ok(checkout) => checkout,
        Err(errors) => {
            tracing::info!(
                invalid_fields = errors.len(),
                first_invalid = ?errors.first().map(|f| f.name()),
                "Checkout form rejected"
            );
            let chrome = PageChrome::load(&state, &visitor, &session, nonce).await?;
            let form = form.with_formatted_card_number();
            let page = CheckoutTemplate::new(chrome, &snapshot, &form, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    // The snapshot leaves the session before the order is stored; a resubmit
    // after a partial failure then lands on the cart instead of ordering twice.
    take_snapshot(&session).await?;

    let placed = {
        let store = state.visitor_store(&visitor);
        let mut rng = rand::rng();
        place_order(&store, &snapshot, checkout, Utc::now(), &mut rng)
    };
    let order = match placed {
        Ok(order) => order,
        Err(e) => {
            save_snapshot(&session, &snapshot).await?;
            return Err(AppError::Internal(format!("failed to place order: {e}")));
        }
    };

    remember_order(&session, &order.order_id).await?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        &[("order_id", order.order_id.as_str())],
    );

    Ok(Redirect::to("/order-confirmation").into_response())
}

/// Display the order placed last in this session.
#[instrument(skip(state, session, nonce), fields(visitor = %visitor))]
pub async fn confirmation(
    State(state): State<AppState>,
    visitor: VisitorId,
    session: Session,
    nonce: CspNonce,
) -> Result<Response> {
    let Some(order_id) = last_order_id(&session).await else {
        return Ok(Redirect::to("/cart").into_response());
    };
    let Some(order) = state.visitor_store(&visitor).find_order(&order_id)? else {
        tracing::warn!(order_id = %order_id, "Last order not found in visitor history");
        return Ok(Redirect::to("/cart").into_response());
    };

    let chrome = PageChrome::load(&state, &visitor, &session, nonce).await?;
    Ok(ConfirmationTemplate {
        chrome,
        order: OrderView::from(&order),
    }
    .into_response())
}
