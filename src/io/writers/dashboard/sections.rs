//! One function per dashboard section.

use super::{attr, esc, truncation_note, RenderContext};
use crate::artifacts::format_size;
use crate::core::{ArtifactFile, ArtifactType, TimelineEntry, TopologyType, WorkloadRecord};
use crate::patterns::Severity;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const TIMELINE_MESSAGE_LIMIT: usize = 200;
const TEST_ERROR_LIMIT: usize = 200;
const SAMPLE_MESSAGE_LIMIT: usize = 150;
const QUICK_DIAGNOSIS_PODS: usize = 10;

/// Link groups of the cluster resources panel. A file lands in the first
/// category whose marker it contains.
const RESOURCE_CATEGORIES: [(&str, &str); 18] = [
    ("ConfigMaps", "z_configmaps"),
    ("Services", "z_services"),
    ("PVCs", "z_persistent_volume_claims"),
    ("Secrets", "z_secret_"),
    ("Deployments", "z_deployments"),
    ("StatefulSets", "z_statefulsets"),
    ("Roles", "z_roles"),
    ("RoleBindings", "z_rolebindings"),
    ("ClusterRoles", "z_clusterroles"),
    ("ClusterRoleBindings", "z_clusterrolebindings"),
    ("ServiceAccounts", "z_service_accounts"),
    ("Webhooks", "z_validatingwebhook"),
    ("CRDs", "z_mongodb_crds"),
    ("Nodes", "z_nodes_detailed"),
    ("Events (YAML)", "events_detailed.yaml"),
    ("Events (text)", "events.txt"),
    ("Diagnostics", "0_diagnostics"),
    ("Metrics", "metrics_"),
];

pub(crate) fn status_color(status: &str) -> &'static str {
    match status.to_ascii_lowercase().as_str() {
        "passed" | "success" => "#28a745",
        "failed" | "failure" => "#dc3545",
        _ => "#6c757d",
    }
}

pub(crate) fn topology_label(kind: TopologyType) -> &'static str {
    match kind {
        TopologyType::SingleCluster => "single-cluster",
        TopologyType::MultiCluster => "multi-cluster",
    }
}

/// Everything after the last `_`, the readable tail of a dump file name.
fn short_name(file: &str) -> &str {
    file.rsplit('_').next().unwrap_or(file)
}

fn location_label(cluster: &str, namespace: &str) -> String {
    if cluster == crate::naming::DEFAULT_CLUSTER {
        namespace.to_string()
    } else {
        format!("{cluster}/{namespace}")
    }
}

/// Split rows by cluster when the run spanned several clusters.
fn by_cluster<'t, T>(ctx: &RenderContext<'_>, items: &'t [T], cluster: fn(&T) -> &str) -> Vec<(Option<&'t str>, Vec<&'t T>)> {
    if !ctx.doc.topology.is_multi_cluster() {
        return vec![(None, items.iter().collect())];
    }
    let mut groups: BTreeMap<&str, Vec<&T>> = BTreeMap::new();
    for item in items {
        groups.entry(cluster(item)).or_default().push(item);
    }
    groups.into_iter().map(|(name, rows)| (Some(name), rows)).collect()
}

fn cluster_heading(cluster: Option<&str>) -> String {
    cluster
        .map(|name| format!(r#"<h4 class="cluster-heading">Cluster {}</h4>"#, esc(name)))
        .unwrap_or_default()
}

pub(crate) fn quick_diagnosis(ctx: &RenderContext<'_>) -> String {
    let doc = ctx.doc;
    let tests = &doc.test_run.tests;
    let unhealthy: Vec<_> = doc
        .resources
        .pods
        .iter()
        .filter(|pod| !pod.is_healthy() || pod.restarts > 0)
        .collect();

    let mut html = String::from(r#"<div class="quick-diagnosis"><h3>Quick Diagnosis</h3><ul>"#);
    html.push_str(&format!(
        "<li><strong>Test Status:</strong> {} ({}/{} tests failed)</li>",
        esc(&doc.meta.status),
        tests.failed,
        tests.total
    ));
    html.push_str(&format!(
        "<li><strong>Unhealthy Pods:</strong> {}",
        doc.resources.unhealthy_pod_count()
    ));
    if !unhealthy.is_empty() {
        html.push_str("<ul>");
        for pod in unhealthy.iter().take(QUICK_DIAGNOSIS_PODS) {
            html.push_str(&format!(
                "<li><code>{}</code> {} (restarts: {})</li>",
                esc(&location_label(&pod.cluster, &pod.name)),
                esc(&pod.phase),
                pod.restarts
            ));
        }
        html.push_str("</ul>");
    }
    html.push_str("</li>");
    html.push_str(&format!(
        "<li><strong>Total Errors:</strong> {} errors detected across {} patterns</li>",
        doc.errors.len(),
        doc.error_patterns.len()
    ));
    html.push_str(&format!(
        "<li><strong>Topology:</strong> {} ({} cluster(s))</li>",
        topology_label(doc.topology.kind),
        doc.topology.clusters.len()
    ));
    html.push_str("</ul></div>");
    html
}

pub(crate) fn diagnostics_links(ctx: &RenderContext<'_>) -> String {
    if ctx.doc.diagnostics.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<div class="diagnostics-links"><strong>Diagnostics:</strong> "#);
    for (label, diagnostics) in &ctx.doc.diagnostics {
        html.push_str(&ctx.file_tag(&diagnostics.file, label));
        html.push(' ');
    }
    html.push_str("</div>");
    html
}

pub(crate) fn warnings_panel(ctx: &RenderContext<'_>) -> String {
    let warnings = &ctx.doc.warnings;
    if warnings.is_empty() {
        return String::new();
    }
    let limit = ctx.limits.generic_row_limit;
    let mut html = format!(
        r#"<h2>Collection warnings ({})</h2><div class="section warnings-panel"><table><tr><th>Stage</th><th>File</th><th>Message</th></tr>"#,
        warnings.len()
    );
    for warning in warnings.iter().take(limit) {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            esc(&warning.stage),
            warning
                .file
                .as_deref()
                .map(|file| ctx.file_tag(file, file))
                .unwrap_or_else(|| "-".to_string()),
            esc(&warning.message)
        ));
    }
    html.push_str("</table>");
    html.push_str(&truncation_note(limit.min(warnings.len()), warnings.len(), "warnings"));
    html.push_str("</div>");
    html
}

pub(crate) fn failed_tests(ctx: &RenderContext<'_>) -> String {
    let failed: Vec<_> = ctx.doc.test_run.failed_cases().collect();
    if failed.is_empty() {
        return String::new();
    }
    let mut html = format!(r#"<h2>Failed Tests ({})</h2><div class="section">"#, failed.len());
    for case in failed {
        html.push_str(r#"<div class="failed-test"><div class="failed-test-header">"#);
        html.push_str(&format!(
            r#"<span class="test-name"><strong>{}</strong></span><span class="test-duration">{:.1}s</span></div>"#,
            esc(&case.name),
            case.duration
        ));
        let message = case.error_message.as_deref().unwrap_or("Unknown error");
        html.push_str(&ctx.expandable("test-error", message, TEST_ERROR_LIMIT));
        if !case.file.is_empty() {
            let location = if case.line.is_empty() {
                case.file.clone()
            } else {
                format!("{}:{}", case.file, case.line)
            };
            html.push_str(&format!(r#"<div class="test-location">{}</div>"#, esc(&location)));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

pub(crate) fn error_catalog(ctx: &RenderContext<'_>) -> String {
    let doc = ctx.doc;
    let mut html = String::from(r#"<h2>Error Catalog</h2><div class="section">"#);
    if doc.error_patterns.is_empty() {
        html.push_str("<p>No errors detected</p></div>");
        return html;
    }

    let by_id: HashMap<&str, _> = doc.errors.iter().map(|e| (e.id.as_str(), e)).collect();
    let top = ctx.limits.top_patterns;

    for pattern in doc.error_patterns.iter().take(top) {
        html.push_str(&format!(
            r#"<div class="error-pattern {}"><h4>{} ({} occurrences)</h4>"#,
            pattern.severity.as_str(),
            esc(&pattern.description),
            pattern.count
        ));
        html.push_str(&format!(
            r#"<p><strong>Pattern:</strong> <code>{}</code> <span class="badge badge-{}">{}</span></p>"#,
            esc(&pattern.pattern),
            pattern.severity.as_str(),
            pattern.severity.as_str()
        ));
        html.push_str(&format!(
            "<p><strong>Affected resources ({}):</strong> {}</p>",
            pattern.affected_resources.len(),
            esc(&pattern.affected_resources.join(", "))
        ));
        if let (Some(first), Some(last)) = (&pattern.first_occurrence, &pattern.last_occurrence) {
            html.push_str(&format!(
                "<p><strong>Seen:</strong> {} &ndash; {}</p>",
                esc(first),
                esc(last)
            ));
        }

        let samples: Vec<_> = pattern
            .error_ids
            .iter()
            .take(ctx.limits.samples_per_pattern)
            .filter_map(|id| by_id.get(id.as_str()))
            .collect();
        if !samples.is_empty() {
            let id = ctx.element_id("samples");
            html.push_str(&format!(
                r#"<button class="toggle-btn" data-action="toggle" data-target="{id}">Show sample errors</button><div id="{id}" class="sample-errors" hidden>"#
            ));
            for error in samples {
                html.push_str(r#"<div class="sample-error"><div class="sample-error-header">"#);
                html.push_str(&ctx.file_tag(
                    &error.source.file,
                    &format!("{}:{}", error.source.file, error.source.line),
                ));
                if let Some(timestamp) = &error.timestamp {
                    html.push_str(&format!(r#"<span class="error-time">{}</span>"#, esc(timestamp)));
                }
                html.push_str("</div>");
                html.push_str(&ctx.expandable("error-message", &error.message, SAMPLE_MESSAGE_LIMIT));
                html.push_str("</div>");
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
    }
    html.push_str(&truncation_note(
        top.min(doc.error_patterns.len()),
        doc.error_patterns.len(),
        "patterns",
    ));
    html.push_str("</div>");
    html
}

// ---------------------------------------------------------------------------
// Resource browser
// ---------------------------------------------------------------------------

pub(crate) fn resource_browser(ctx: &RenderContext<'_>) -> String {
    let resources = &ctx.doc.resources;
    let mut tabs: Vec<(String, String)> = vec![
        (format!("Pods ({})", resources.pods.len()), pods_table(ctx)),
        (
            format!("StatefulSets ({})", resources.statefulsets.len()),
            workload_table(ctx, &resources.statefulsets, "StatefulSets", true),
        ),
        (
            format!("Deployments ({})", resources.deployments.len()),
            workload_table(ctx, &resources.deployments, "Deployments", false),
        ),
    ];
    for group in resources.generic.values() {
        tabs.push((
            format!("{} ({})", group.display_name, group.items.len()),
            generic_table(ctx, group),
        ));
    }

    let mut html = String::from(r#"<h2>Resource Inventory</h2><div class="section"><div class="tab-bar">"#);
    let ids: Vec<String> = tabs.iter().map(|_| ctx.element_id("tab")).collect();
    for (index, ((label, _), id)) in tabs.iter().zip(&ids).enumerate() {
        html.push_str(&format!(
            r#"<button class="tab-button{}" data-action="tab" data-target="{}">{}</button>"#,
            if index == 0 { " active" } else { "" },
            id,
            esc(label)
        ));
    }
    html.push_str("</div>");
    for (index, ((_, body), id)) in tabs.iter().zip(&ids).enumerate() {
        html.push_str(&format!(
            r#"<div id="{}" class="tab-panel"{}>{}</div>"#,
            id,
            if index == 0 { "" } else { " hidden" },
            body
        ));
    }
    html.push_str(&cluster_resources(ctx));
    html.push_str(&resource_graph(ctx));
    html.push_str("</div>");
    html
}

fn pods_table(ctx: &RenderContext<'_>) -> String {
    let pods = &ctx.doc.resources.pods;
    if pods.is_empty() {
        return "<p>No pods found</p>".to_string();
    }
    let limit = ctx.limits.table_row_limit;
    let mut html = String::new();

    for (cluster, rows) in by_cluster(ctx, pods, |p| p.cluster.as_str()) {
        html.push_str(&cluster_heading(cluster));
        html.push_str("<table><tr><th>#</th><th>Name</th><th>Namespace</th><th>Phase</th><th>Ready</th><th>Restarts</th><th>Age</th><th>Logs</th><th>Agent</th></tr>");
        for (index, pod) in rows.iter().take(limit).enumerate() {
            let health = if pod.is_healthy() { "healthy" } else { "unhealthy" };
            let detail_id = ctx.element_id("pod-files");
            html.push_str(&format!(
                r#"<tr class="{health} clickable" data-action="toggle" data-target="{detail_id}"><td class="row-number">{}</td><td class="resource-name">{}</td><td>{}</td><td><span class="badge badge-{health}">{}</span></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                index + 1,
                esc(&pod.name),
                esc(&pod.namespace),
                esc(&pod.phase),
                esc(&pod.ready),
                pod.restarts,
                ctx.age(&pod.created),
                pod.files.logs.len(),
                pod.files.agent_logs.len(),
            ));

            html.push_str(&format!(
                r#"<tr id="{detail_id}" class="pod-files-row" hidden><td colspan="9"><div class="pod-files-detail">"#
            ));
            for container in &pod.containers {
                html.push_str(&format!(
                    r#"<span class="container-state {}">{}: {}{}</span> "#,
                    if container.ready { "ready" } else { "not-ready" },
                    esc(&container.name),
                    container.state.as_str(),
                    container
                        .exit_code
                        .map(|code| format!(" (last exit {code})"))
                        .unwrap_or_default(),
                ));
            }
            let files = pod.files.all();
            if files.is_empty() {
                html.push_str(r#"<span class="truncation-note">No files found for this pod</span>"#);
            }
            for file in files {
                html.push_str(&ctx.file_tag(file, short_name(file)));
                html.push(' ');
            }
            html.push_str("</div></td></tr>");
        }
        html.push_str("</table>");
        html.push_str(&truncation_note(limit.min(rows.len()), rows.len(), "pods"));
    }
    html
}

fn workload_table(ctx: &RenderContext<'_>, workloads: &[WorkloadRecord], noun: &str, with_owner: bool) -> String {
    if workloads.is_empty() {
        return format!("<p>No {} found</p>", esc(noun));
    }
    let limit = ctx.limits.table_row_limit;
    let mut html = String::new();

    for (cluster, rows) in by_cluster(ctx, workloads, |w| w.cluster.as_str()) {
        html.push_str(&cluster_heading(cluster));
        html.push_str("<table><tr><th>#</th><th>Name</th><th>Namespace</th><th>Ready</th><th>Current</th>");
        if with_owner {
            html.push_str("<th>Owner</th>");
        }
        html.push_str("<th>Age</th><th>YAML</th></tr>");
        for (index, workload) in rows.iter().take(limit).enumerate() {
            let health = if workload.is_healthy() { "healthy" } else { "unhealthy" };
            html.push_str(&format!(
                r#"<tr class="{health}"><td class="row-number">{}</td><td class="resource-name">{}</td><td>{}</td><td>{}/{}</td><td>{}</td>"#,
                index + 1,
                esc(&workload.name),
                esc(&workload.namespace),
                workload.ready_replicas,
                workload.desired_replicas,
                workload.current_replicas,
            ));
            if with_owner {
                html.push_str(&format!(
                    r#"<td class="resource-name">{}</td>"#,
                    esc(workload.owner_ref.as_deref().unwrap_or("-"))
                ));
            }
            html.push_str(&format!(
                "<td>{}</td><td>{}</td></tr>",
                ctx.age(&workload.created),
                ctx.file_tag(&workload.source_file, "view")
            ));
        }
        html.push_str("</table>");
        html.push_str(&truncation_note(limit.min(rows.len()), rows.len(), &noun.to_lowercase()));
    }
    html
}

fn generic_table(ctx: &RenderContext<'_>, group: &crate::core::ResourceGroup) -> String {
    let mut html = String::new();
    if !group.source_files.is_empty() {
        html.push_str(r#"<p class="source-files">"#);
        for source in &group.source_files {
            html.push_str(&ctx.file_tag(&source.name, &location_label(&source.cluster, &source.namespace)));
            html.push(' ');
        }
        html.push_str("</p>");
    }
    if group.items.is_empty() {
        html.push_str("<p>No items</p>");
        return html;
    }

    let limit = ctx.limits.generic_row_limit;
    for (cluster, rows) in by_cluster(ctx, &group.items, |g| g.cluster.as_str()) {
        html.push_str(&cluster_heading(cluster));
        html.push_str("<table><tr><th>#</th><th>Name</th><th>Namespace</th><th>Kind</th><th>Age</th></tr>");
        for (index, item) in rows.iter().take(limit).enumerate() {
            html.push_str(&format!(
                r#"<tr><td class="row-number">{}</td><td class="resource-name">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                index + 1,
                esc(&item.name),
                esc(&item.namespace),
                esc(&item.kind),
                ctx.age(&item.created),
            ));
        }
        html.push_str("</table>");
        html.push_str(&truncation_note(limit.min(rows.len()), rows.len(), "items"));
    }
    html
}

fn cluster_resources(ctx: &RenderContext<'_>) -> String {
    let by_cluster = &ctx.doc.artifacts.by_cluster;
    if by_cluster.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<h3 class="subsection">Cluster Resources</h3>"#);

    for (cluster, namespaces) in by_cluster {
        for (namespace, artifacts) in namespaces {
            let mut seen: BTreeSet<&str> = BTreeSet::new();
            let mut tags = Vec::new();

            for (label, marker) in RESOURCE_CATEGORIES {
                let matching: Vec<&ArtifactFile> = artifacts
                    .files
                    .iter()
                    .filter(|f| f.name.contains(marker) && !seen.contains(f.name.as_str()))
                    .collect();
                for file in &matching {
                    let display = if file.name.contains("z_secret_") {
                        format!("{label}: {}", crate::naming::secret_name(&file.name))
                    } else if matching.len() == 1 {
                        label.to_string()
                    } else {
                        format!("{label}: {}", file.name.rsplit("_z_").next().unwrap_or(&file.name))
                    };
                    tags.push(ctx.file_tag(&file.name, &display));
                    seen.insert(file.name.as_str());
                }
            }

            for file in &artifacts.files {
                let structural = matches!(
                    file.kind,
                    ArtifactType::Events | ArtifactType::Diagnostics | ArtifactType::Config | ArtifactType::Health
                );
                if !seen.contains(file.name.as_str()) && (crate::naming::is_resource_dump(&file.name) || structural) {
                    tags.push(ctx.file_tag(&file.name, short_name(&file.name)));
                    seen.insert(file.name.as_str());
                }
            }

            if tags.is_empty() {
                continue;
            }
            html.push_str(&format!(
                r#"<div class="cluster-resources-group"><h4 class="resource-name">{}</h4><div class="cluster-resources-grid">{}</div></div>"#,
                esc(&location_label(cluster, namespace)),
                tags.join("")
            ));
        }
    }
    html
}

fn resource_graph(ctx: &RenderContext<'_>) -> String {
    let edges = &ctx.doc.resource_graph.edges;
    let mut html = format!(r#"<h3 class="subsection">Ownership ({} edges)</h3>"#, edges.len());
    if edges.is_empty() {
        html.push_str("<p>No owner references recorded</p>");
        return html;
    }
    let limit = ctx.limits.generic_row_limit;
    html.push_str("<table><tr><th>Resource</th><th>Owned by</th></tr>");
    for edge in edges.iter().take(limit) {
        html.push_str(&format!(
            r#"<tr><td class="resource-name">{}</td><td class="resource-name">{}</td></tr>"#,
            esc(&edge.from),
            esc(&edge.to)
        ));
    }
    html.push_str("</table>");
    html.push_str(&truncation_note(limit.min(edges.len()), edges.len(), "edges"));
    html
}

// ---------------------------------------------------------------------------
// Timeline and artifacts
// ---------------------------------------------------------------------------

pub(crate) fn timeline(ctx: &RenderContext<'_>) -> String {
    let entries = &ctx.doc.timeline;
    let limit = ctx.limits.timeline_limit;
    let mut html = format!(
        r#"<h2 class="collapsible" data-action="collapse">Timeline ({} events)</h2><div class="collapsible-content section"><div class="timeline-scroll">"#,
        entries.len()
    );
    if entries.is_empty() {
        html.push_str("<p>No timestamped events or errors</p>");
    }
    for (index, entry) in entries.iter().take(limit).enumerate() {
        html.push_str(&timeline_entry(ctx, index, entry));
    }
    html.push_str("</div>");
    html.push_str(&truncation_note(limit.min(entries.len()), entries.len(), "events"));
    html.push_str("</div>");
    html
}

fn timeline_entry(ctx: &RenderContext<'_>, index: usize, entry: &TimelineEntry) -> String {
    let severity = entry.severity();
    let badge = match (entry, severity) {
        (TimelineEntry::K8sEvent(event), _) if event.event_type == "Warning" => "badge-warning",
        (_, Some(Severity::Warning)) => "badge-warning",
        (_, Some(Severity::Error | Severity::Critical)) => "badge-error",
        _ => "",
    };

    let time = entry
        .timestamp()
        .map(|ts| {
            let clock = ts.get(11..19).unwrap_or(ts);
            format!(r#"<span class="timeline-timestamp" title="{}">{}</span>"#, attr(ts), esc(clock))
        })
        .unwrap_or_default();

    let (kind, extra) = match entry {
        TimelineEntry::K8sEvent(event) => {
            let mut extra = String::new();
            if !event.reason.is_empty() {
                extra.push_str(&format!(r#"<span class="event-reason">{}</span>"#, esc(&event.reason)));
            }
            if event.count > 1 {
                extra.push_str(&format!(r#"<span class="event-count">x{}</span>"#, event.count));
            }
            ("k8s_event", extra)
        }
        TimelineEntry::LogError(error) => (
            "log_error",
            format!(r#"<span class="event-reason">{}</span>"#, esc(&error.error_id)),
        ),
    };

    format!(
        r#"<div class="timeline-entry {kind} {severity} {badge}"><div class="timeline-number">{number}</div><div class="timeline-content"><div class="timeline-header">{time}{extra}<span class="timeline-resource">{resource}</span></div>{message}</div></div>"#,
        severity = severity.map(|s| s.as_str()).unwrap_or(""),
        number = index + 1,
        resource = esc(entry.resource()),
        message = ctx.expandable("timeline-message", entry.message(), TIMELINE_MESSAGE_LIMIT),
    )
}

pub(crate) fn artifacts(ctx: &RenderContext<'_>) -> String {
    let catalog = &ctx.doc.artifacts;
    let summary = &catalog.summary;
    let mut html = format!(
        r#"<h2 class="collapsible" data-action="collapse">Artifacts ({} files, {})</h2><div class="collapsible-content section">"#,
        summary.total_files,
        format_size(summary.total_size_bytes)
    );
    let by_type: Vec<String> = summary
        .by_type
        .iter()
        .map(|(kind, stats)| format!("{}: {}", esc(kind), stats.count))
        .collect();
    html.push_str(&format!("<p><strong>By type:</strong> {}</p>", by_type.join(", ")));

    if catalog.by_cluster.is_empty() {
        html.push_str("<p>No artifacts found</p></div>");
        return html;
    }

    let present: BTreeSet<&str> = catalog
        .by_cluster
        .values()
        .flat_map(|namespaces| namespaces.values())
        .flat_map(|ns| ns.by_type.keys().map(String::as_str))
        .collect();
    let columns: Vec<ArtifactType> = ArtifactType::ALL
        .into_iter()
        .filter(|kind| present.contains(kind.as_str()))
        .collect();

    html.push_str(r#"<table class="artifacts-table"><tr><th>Cluster</th><th>Files</th><th>Size</th>"#);
    for column in &columns {
        html.push_str(&format!("<th>{}</th>", column.label()));
    }
    html.push_str("</tr>");

    let limit = ctx.limits.generic_row_limit;
    let rows: Vec<_> = catalog
        .by_cluster
        .iter()
        .flat_map(|(cluster, namespaces)| namespaces.iter().map(move |(ns, artifacts)| (cluster, ns, artifacts)))
        .collect();
    for (cluster, namespace, artifacts) in rows.iter().take(limit) {
        html.push_str(&format!(
            r#"<tr><td class="resource-name">{}</td><td>{}</td><td>{}</td>"#,
            esc(&location_label(cluster, namespace)),
            artifacts.files.len(),
            format_size(artifacts.total_size_bytes)
        ));
        for column in &columns {
            match artifacts.by_type.get(column.as_str()) {
                Some(stats) => html.push_str(&format!("<td>{}</td>", stats.count)),
                None => html.push_str(r#"<td class="empty-cell">-</td>"#),
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html.push_str(&truncation_note(limit.min(rows.len()), rows.len(), "namespaces"));
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::core::{EmbeddedContent, ErrorPatternSummary, ErrorRecord, ErrorSource, TestSummaryDocument};

    fn error(id: &str, message: &str) -> ErrorRecord {
        ErrorRecord {
            id: id.into(),
            timestamp: Some("2024-05-01T11:02:00Z".into()),
            severity: Severity::Error,
            pattern: "connection_refused".into(),
            source: ErrorSource {
                resource: "Pod/default/ns/p-0".into(),
                container: "mongod".into(),
                file: "_ns_p-0-mongod-container.log".into(),
                line: 7,
            },
            message: message.into(),
            context: String::new(),
        }
    }

    fn catalog_doc(samples: usize) -> TestSummaryDocument {
        let mut doc = TestSummaryDocument::default();
        doc.errors = (0..samples).map(|i| error(&format!("err-{i:04}"), &format!("refused #{i}"))).collect();
        doc.error_patterns.push(ErrorPatternSummary {
            pattern: "connection_refused".into(),
            count: samples,
            description: "Connection refused".into(),
            severity: Severity::Error,
            affected_resources: vec!["Pod/default/ns/p-0".into()],
            error_ids: doc.errors.iter().map(|e| e.id.clone()).collect(),
            first_occurrence: Some("2024-05-01T11:02:00Z".into()),
            last_occurrence: Some("2024-05-01T11:02:00Z".into()),
        });
        doc
    }

    #[test]
    fn test_status_color() {
        assert_eq!(status_color("passed"), "#28a745");
        assert_eq!(status_color("SUCCESS"), "#28a745");
        assert_eq!(status_color("failed"), "#dc3545");
        assert_eq!(status_color("unknown"), "#6c757d");
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("_ns_my-rs-0-pod-describe.txt"), "my-rs-0-pod-describe.txt");
        assert_eq!(short_name("plain.log"), "plain.log");
    }

    #[test]
    fn test_error_catalog_limits_samples() {
        let doc = catalog_doc(6);
        let embedded = EmbeddedContent::new();
        let limits = RenderConfig::default();
        let ctx = RenderContext::new(&doc, &embedded, &limits);
        let html = error_catalog(&ctx);

        assert!(html.contains("Connection refused (6 occurrences)"));
        assert_eq!(html.matches(r#"class="sample-error""#).count(), 3);
        assert!(html.contains("refused #2"));
        assert!(!html.contains("refused #3"));
    }

    #[test]
    fn test_empty_catalog() {
        let doc = TestSummaryDocument::default();
        let embedded = EmbeddedContent::new();
        let limits = RenderConfig::default();
        let ctx = RenderContext::new(&doc, &embedded, &limits);
        assert!(error_catalog(&ctx).contains("No errors detected"));
        assert_eq!(warnings_panel(&ctx), "");
        assert_eq!(failed_tests(&ctx), "");
    }

    #[test]
    fn test_timeline_respects_limit() {
        let mut doc = catalog_doc(0);
        doc.timeline = (0..5)
            .map(|i| {
                TimelineEntry::LogError(crate::core::LogErrorEntry {
                    timestamp: Some(format!("2024-05-01T11:0{i}:00Z")),
                    severity: Some(Severity::Error),
                    resource: "Pod/default/ns/p-0".into(),
                    message: format!("boom {i}"),
                    error_id: format!("err-{i:04}"),
                })
            })
            .collect();
        let embedded = EmbeddedContent::new();
        let limits = RenderConfig {
            timeline_limit: 2,
            ..RenderConfig::default()
        };
        let ctx = RenderContext::new(&doc, &embedded, &limits);
        let html = timeline(&ctx);

        assert_eq!(html.matches(r#"<div class="timeline-entry "#).count(), 2);
        assert!(html.contains("11:01:00"));
        assert!(html.contains("Showing first 2 of 5 events."));
    }

    #[test]
    fn test_artifact_columns_follow_type_order() {
        let mut doc = TestSummaryDocument::default();
        let mut namespace = crate::core::NamespaceArtifacts::default();
        for kind in ["yaml", "log", "test_results", "json"] {
            namespace
                .by_type
                .insert(kind.to_string(), crate::core::TypeStats::default());
        }
        doc.artifacts
            .by_cluster
            .entry("default".into())
            .or_default()
            .insert("ns".into(), namespace);
        let embedded = EmbeddedContent::new();
        let limits = RenderConfig::default();
        let ctx = RenderContext::new(&doc, &embedded, &limits);

        let html = artifacts(&ctx);
        let header = "<th>Logs</th><th>JSON</th><th>Tests</th><th>YAML</th></tr>";
        assert!(html.contains(header), "{html}");
        assert!(!html.contains("<th>Describe</th>"));
    }
}
