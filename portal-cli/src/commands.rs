//! Subcommand handlers

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use portal_client::flows::EMPTY_FOLIO;
use portal_client::http::TICKET_NOT_FOUND;
use portal_client::status::TURNAROUND;
use portal_client::{
    ArtifactKind, CfdiStatus, CfdiView, ClientConfig, DownloadActions, FacturacionFlow,
    LookupPhase, PortalApi, SolicitudFields, SolicitudFlow, SubmitPhase, TicketLookup, Venta,
};
use shared::catalog::{self, DEFAULT_REGIMEN_FISCAL, DEFAULT_USO_CFDI};

#[derive(clap::Args, Debug)]
pub struct FacturarArgs {
    #[arg(long)]
    pub folio: String,
    #[arg(long)]
    pub rfc: Option<String>,
    #[arg(long)]
    pub razon_social: Option<String>,
    #[arg(long)]
    pub email: String,
    /// Uso de CFDI (see `portal-cli catalogos`)
    #[arg(long, default_value = DEFAULT_USO_CFDI)]
    pub uso_cfdi: String,
    /// Régimen fiscal (see `portal-cli catalogos`)
    #[arg(long, default_value = DEFAULT_REGIMEN_FISCAL)]
    pub regimen: String,
}

pub async fn buscar(api: Arc<dyn PortalApi>, folio: &str) -> anyhow::Result<()> {
    let lookup = TicketLookup::new(api);
    lookup.set_input(folio);

    match lookup.search().await {
        LookupPhase::Found(venta) => {
            print_ticket(&venta);
            print_cfdi(&venta.folio, &CfdiView::render(&venta.cfdi_status()));
            Ok(())
        }
        LookupPhase::Error(message) => bail!(message),
        _ => bail!(lookup.notice().unwrap_or_else(|| EMPTY_FOLIO.to_string())),
    }
}

pub async fn estado(api: Arc<dyn PortalApi>, folio: &str) -> anyhow::Result<()> {
    let folio = folio.trim();
    if folio.is_empty() {
        bail!(EMPTY_FOLIO);
    }
    let record = api
        .get_cfdi_status(folio)
        .await
        .with_context(|| format!("No se pudo consultar el estado del ticket {folio}"))?
        .into_result(TICKET_NOT_FOUND)
        .map_err(|message| anyhow!(message))?;

    let status = CfdiStatus::from(record);
    let code = match status.code() {
        "" => "desconocido",
        code => code,
    };
    println!("Estado CFDI: {code}");
    match &status {
        CfdiStatus::Solicitado {
            ultima_solicitud: Some(solicitud),
        } => println!(
            "Última solicitud: {} ({})",
            solicitud.estatus_solicitud, solicitud.created_at
        ),
        CfdiStatus::Timbrado {
            timbrado_at: Some(at),
            ..
        } => println!("Timbrado: {at}"),
        CfdiStatus::Error {
            mensaje: Some(mensaje),
        } => println!("Detalle: {mensaje}"),
        _ => {}
    }
    print_cfdi(folio, &CfdiView::render(&status));
    if !status.is_terminal() && !status.can_request() {
        println!("Consulte de nuevo más tarde con `portal-cli estado {folio}`.");
    }
    Ok(())
}

pub async fn descargar(
    api: Arc<dyn PortalApi>,
    folio: &str,
    kind: ArtifactKind,
    dir: PathBuf,
) -> anyhow::Result<()> {
    let actions = DownloadActions::new(api, folio.trim(), dir);
    let path = actions.download(kind).await.map_err(|message| anyhow!(message))?;
    println!("{} guardado en {}", kind, path.display());
    Ok(())
}

pub async fn solicitar(
    api: Arc<dyn PortalApi>,
    folio: &str,
    email: String,
    telefono: Option<String>,
    nota: Option<String>,
) -> anyhow::Result<()> {
    let folio = folio.trim();
    match api.get_cfdi_status(folio).await.map(|r| r.into_data()) {
        Ok(Some(record)) => {
            let status = CfdiStatus::from(record);
            if !status.can_request() && !matches!(status, CfdiStatus::Desconocido(_)) {
                bail!("El ticket {folio} ya tiene un CFDI ({})", status.code());
            }
        }
        // The backend has the final word on the request itself
        Ok(None) => {}
        Err(e) => tracing::warn!(%folio, "Could not check CFDI status: {e}"),
    }

    let flow = SolicitudFlow::new(Arc::clone(&api), folio);
    flow.set_fields(SolicitudFields {
        email,
        telefono: telefono.unwrap_or_default(),
        nota: nota.unwrap_or_default(),
    });

    match flow.submit().await {
        SubmitPhase::Success(message) => {
            println!("{message}");
            println!("Tiempo estimado: {TURNAROUND}");
            println!();
            // Reload so the new CFDI state shows up
            if let Err(e) = estado(api, folio).await {
                tracing::warn!(%folio, "Could not reload CFDI status: {e}");
            }
            Ok(())
        }
        phase => bail!(phase.message().unwrap_or("Error al solicitar CFDI").to_string()),
    }
}

pub async fn facturar(
    api: Arc<dyn PortalApi>,
    config: &ClientConfig,
    args: FacturarArgs,
) -> anyhow::Result<()> {
    if catalog::uso_cfdi(&args.uso_cfdi).is_none() {
        tracing::warn!(uso_cfdi = %args.uso_cfdi, "Uso de CFDI not in catalog");
    }
    if catalog::regimen_fiscal(&args.regimen).is_none() {
        tracing::warn!(regimen = %args.regimen, "Régimen fiscal not in catalog");
    }

    let flow = FacturacionFlow::new(api, config.autocomplete_delay);
    flow.set_folio(args.folio);
    if let Some(rfc) = args.rfc {
        flow.set_rfc(rfc);
    }
    if let Some(razon_social) = args.razon_social {
        flow.set_razon_social(razon_social);
    }
    flow.set_email(args.email);
    flow.set_uso_cfdi(args.uso_cfdi);
    flow.set_regimen_fiscal(args.regimen);

    if flow.draft().needs_fiscal_data() {
        autocomplete(&flow, config).await;
    }

    let draft = flow.draft();
    println!("Folio:          {}", draft.folio.trim());
    println!("RFC:            {}", draft.rfc.trim());
    println!("Razón social:   {}", draft.razon_social.trim());
    println!("Uso de CFDI:    {}", describe(catalog::uso_cfdi(&draft.uso_cfdi), &draft.uso_cfdi));
    println!(
        "Régimen fiscal: {}",
        describe(catalog::regimen_fiscal(&draft.regimen_fiscal), &draft.regimen_fiscal)
    );
    println!("Email:          {}", draft.email.trim());
    println!();

    match flow.submit().await {
        SubmitPhase::Success(message) => {
            println!("{message}");
            Ok(())
        }
        phase => bail!(phase.message().unwrap_or("Error al enviar la solicitud").to_string()),
    }
}

/// Let the form's autocomplete fill RFC / razón social, waiting at most
/// one quiet period plus one request timeout.
async fn autocomplete(flow: &FacturacionFlow, config: &ClientConfig) {
    flow.activate();
    let wait = async {
        while flow.autocomplete().is_pending() {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    };
    let limit = config.autocomplete_delay + Duration::from_secs(config.timeout);
    if tokio::time::timeout(limit, wait).await.is_err() {
        tracing::warn!("Fiscal-data lookup timed out");
    }
    flow.deactivate();

    if flow.draft().needs_fiscal_data() {
        tracing::info!("No fiscal data on file for this ticket");
    } else {
        tracing::info!("RFC and razón social filled from the ticket");
    }
}

fn describe(entry: Option<&catalog::CatalogEntry>, code: &str) -> String {
    entry.map_or_else(|| code.to_string(), ToString::to_string)
}

pub fn catalogos() {
    println!("Uso de CFDI");
    for entry in catalog::USOS_CFDI {
        println!("  {entry}");
    }
    println!();
    println!("Régimen fiscal");
    for entry in catalog::REGIMENES_FISCALES {
        println!("  {entry}");
    }
}

fn print_ticket(venta: &Venta) {
    let fecha = venta
        .fecha_parsed()
        .map(|f| f.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| venta.fecha.clone());

    println!("Ticket {}", venta.folio);
    println!("  Fecha:     {fecha}");
    println!("  Sucursal:  {}", venta.sucursal);
    println!("  Cliente:   {}", venta.cliente_nombre);
    if let Some(rfc) = &venta.cliente_rfc {
        println!("  RFC:       {rfc}");
    }
    println!("  Pago:      {} ({})", venta.metodo_pago, venta.estatus);
    println!();
    for item in &venta.items {
        println!(
            "  {:>6} {:<4} {:<36} {:>12}",
            item.cantidad.normalize(),
            item.unidad,
            item.nombre,
            format!("${:.2}", item.total)
        );
    }
    println!();
    println!("  {:<12}{:>12}", "Subtotal", format!("${:.2}", venta.subtotal));
    if !venta.descuento_total.is_zero() {
        println!("  {:<12}{:>12}", "Descuento", format!("-${:.2}", venta.descuento_total));
    }
    println!("  {:<12}{:>12}", "Impuestos", format!("${:.2}", venta.impuestos));
    println!("  {:<12}{:>12}", "Total", format!("${:.2}", venta.total));
    println!();
}

fn print_cfdi(folio: &str, view: &CfdiView) {
    if !view.is_visible() {
        println!("CFDI no solicitado. Use `portal-cli solicitar {folio}` o `portal-cli facturar`.");
        return;
    }
    println!("{}", view.title());
    println!("{}", view.message());
    if let Some(uuid) = view.uuid() {
        println!("UUID: {uuid}");
    }
    for kind in view.download_actions() {
        println!("  {}: portal-cli descargar {folio} --tipo {kind}", kind.label());
    }
}
