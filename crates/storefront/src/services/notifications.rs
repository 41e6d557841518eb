//! Order notification emails.
//!
//! The dispatcher renders one of the named order templates and makes exactly
//! one delivery attempt through the configured [`MailRelay`]. It never returns
//! an error: the outcome is reported as a [`DispatchOutcome`] and failures are
//! logged, so the order change that triggered the email always stands.

use std::sync::Arc;

use askama::Template;
use chrono::{DateTime, Utc};
use serde::Serialize;

use fashion_store_core::{Email, OrderId, OrderStatus, Price, format_order_date};

use super::email::MailRelay;
use crate::filters;
use crate::models::{CartEntry, Order, ShippingAddress};

/// Sent once an order is placed.
pub const ORDER_CONFIRMATION: &str = "order_confirmation";
/// Sent when the back-office changes an order's status.
pub const ORDER_STATUS_UPDATE: &str = "order_status_update";

/// Values available to the order templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationContext {
    /// Name from the shipping address.
    pub customer_name: String,
    pub order_id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub total_amount: Price,
    pub items: Vec<CartEntry>,
    pub shipping_address: ShippingAddress,
    pub new_status: Option<OrderStatus>,
    /// Public base URL, with a trailing slash.
    pub site_url: String,
}

impl NotificationContext {
    /// Context describing `order`.
    #[must_use]
    pub fn for_order(order: &Order, site_url: &str) -> Self {
        Self {
            customer_name: order.shipping_address.name.clone(),
            order_id: order.id,
            placed_at: order.created_at,
            total_amount: order.total_amount,
            items: order.items.clone(),
            shipping_address: order.shipping_address.clone(),
            new_status: None,
            site_url: site_url.to_owned(),
        }
    }

    /// Same context, announcing `status`.
    #[must_use]
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.new_status = Some(status);
        self
    }

    fn order_date(&self) -> String {
        format_order_date(self.placed_at)
    }

    fn status_label(&self) -> &str {
        self.new_status.as_ref().map_or("", OrderStatus::as_str)
    }
}

/// What happened to a dispatched email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The relay accepted the message.
    Delivered,
    /// No relay is configured; nothing was attempted.
    Disabled,
    /// The single attempt failed. The error was logged.
    Failed,
}

impl DispatchOutcome {
    #[must_use]
    pub const fn delivered(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    ctx: &'a NotificationContext,
    order_date: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    ctx: &'a NotificationContext,
    order_date: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_status_update.html")]
struct OrderStatusUpdateHtml<'a> {
    ctx: &'a NotificationContext,
    order_date: &'a str,
    status: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_status_update.txt")]
struct OrderStatusUpdateText<'a> {
    ctx: &'a NotificationContext,
    order_date: &'a str,
    status: &'a str,
}

/// A rendered message, ready for the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Subject line for a template.
#[must_use]
pub fn subject_for(template: &str, ctx: &NotificationContext) -> String {
    match template {
        ORDER_CONFIRMATION => format!("Order Confirmation - {}", ctx.order_id),
        ORDER_STATUS_UPDATE => format!("Order {} Status: {}", ctx.order_id, ctx.status_label()),
        _ => format!("Order {} Update", ctx.order_id),
    }
}

/// Plain body used when a template is unknown or fails to render.
#[must_use]
pub fn fallback_body(template: &str, ctx: &NotificationContext) -> String {
    let context = serde_json::to_string(ctx).unwrap_or_default();
    format!("Email content for {template} with context: {context}")
}

fn render_bodies(template: &str, ctx: &NotificationContext) -> askama::Result<Option<(String, String)>> {
    let order_date = ctx.order_date();
    let bodies = match template {
        ORDER_CONFIRMATION => Some((
            OrderConfirmationHtml {
                ctx,
                order_date: &order_date,
            }
            .render()?,
            OrderConfirmationText {
                ctx,
                order_date: &order_date,
            }
            .render()?,
        )),
        ORDER_STATUS_UPDATE => {
            let status = ctx.status_label();
            Some((
                OrderStatusUpdateHtml {
                    ctx,
                    order_date: &order_date,
                    status,
                }
                .render()?,
                OrderStatusUpdateText {
                    ctx,
                    order_date: &order_date,
                    status,
                }
                .render()?,
            ))
        }
        _ => None,
    };
    Ok(bodies)
}

/// Render `template`, falling back to a plain summary instead of failing.
#[must_use]
pub fn render(template: &str, ctx: &NotificationContext) -> RenderedEmail {
    let (html_body, text_body) = match render_bodies(template, ctx) {
        Ok(Some(bodies)) => bodies,
        Ok(None) => {
            tracing::warn!(template, "unknown email template, sending fallback body");
            let body = fallback_body(template, ctx);
            (body.clone(), body)
        }
        Err(e) => {
            tracing::warn!(template, error = %e, "email template failed to render, sending fallback body");
            let body = fallback_body(template, ctx);
            (body.clone(), body)
        }
    };

    RenderedEmail {
        subject: subject_for(template, ctx),
        html_body,
        text_body,
    }
}

/// Best-effort order email sender.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    relay: Option<Arc<dyn MailRelay>>,
}

impl NotificationDispatcher {
    /// Dispatcher sending through `relay`.
    #[must_use]
    pub fn new(relay: Arc<dyn MailRelay>) -> Self {
        Self { relay: Some(relay) }
    }

    /// Dispatcher that reports every send as [`DispatchOutcome::Disabled`].
    #[must_use]
    pub fn disabled() -> Self {
        Self { relay: None }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.relay.is_some()
    }

    /// Render `template` for `ctx` and make one delivery attempt to `recipient`.
    pub async fn send(
        &self,
        template: &str,
        ctx: &NotificationContext,
        recipient: &Email,
    ) -> DispatchOutcome {
        let Some(relay) = &self.relay else {
            tracing::debug!(template, order_id = %ctx.order_id, "email disabled, skipping");
            return DispatchOutcome::Disabled;
        };

        let email = render(template, ctx);
        match relay
            .send(&email.subject, recipient, &email.html_body, &email.text_body)
            .await
        {
            Ok(()) => {
                tracing::info!(template, order_id = %ctx.order_id, "order email delivered");
                DispatchOutcome::Delivered
            }
            Err(e) => {
                tracing::warn!(
                    template,
                    order_id = %ctx.order_id,
                    error = %e,
                    "order email failed"
                );
                DispatchOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
