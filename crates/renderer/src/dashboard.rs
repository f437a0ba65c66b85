//! Self-refreshing HTML dashboard.
//!
//! The page is static: it polls `/analyze` from the browser and redraws the
//! cards, the rolling charts and the history table on every response.

/// Rows shown in the history table, newest first.
pub const TABLE_ROWS: usize = 15;

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>pulse · system health</title>
<style>
  :root { --bg:#1e1e2e; --card:#313244; --fg:#cdd6f4; --muted:#a6adc8;
          --ok:#a6e3a1; --warn:#f9e2af; --bad:#f38ba8; --accent:#cba6f7; }
  * { box-sizing:border-box; }
  body { margin:0; padding:24px; background:var(--bg); color:var(--fg);
         font-family:"JetBrains Mono", ui-monospace, monospace; }
  h1 { margin:0 0 4px; font-size:22px; }
  .sub { color:var(--muted); font-size:13px; margin-bottom:20px; }
  .grid { display:grid; grid-template-columns:repeat(auto-fit,minmax(160px,1fr)); gap:12px; }
  .card { background:var(--card); border-radius:6px; padding:14px; }
  .label { color:var(--muted); font-size:12px; text-transform:uppercase; }
  .value { font-size:26px; margin-top:6px; }
  .optimal { color:var(--ok); } .moderate { color:var(--warn); } .critical { color:var(--bad); }
  .charts { display:grid; grid-template-columns:repeat(auto-fit,minmax(300px,1fr)); gap:12px; margin-top:16px; }
  canvas { width:100%; height:140px; }
  table { width:100%; border-collapse:collapse; margin-top:16px; font-size:13px; }
  th, td { padding:6px 8px; text-align:right; border-bottom:1px solid #45475a; }
  th:first-child, td:first-child { text-align:left; }
  a { color:var(--accent); }
  #error { color:var(--bad); margin-top:8px; min-height:1em; }
</style>
</head>
<body>
<h1>System health</h1>
<div class="sub">
  refreshes every __REFRESH_SECS__s ·
  <a href="/analyze">JSON</a> · <a href="/history">history</a> · <a href="/report.pdf">PDF</a>
  · <span id="stamp">waiting for first sample…</span>
</div>

<div class="grid">
  <div class="card"><div class="label">Health</div><div class="value" id="health">–</div><div id="message"></div></div>
  <div class="card"><div class="label">CPU</div><div class="value" id="cpu">–</div></div>
  <div class="card"><div class="label">RAM</div><div class="value" id="ram">–</div></div>
  <div class="card"><div class="label">Disk</div><div class="value" id="disk">–</div></div>
  <div class="card"><div class="label">Error rate</div><div class="value" id="error_rate">–</div></div>
  <div class="card"><div class="label">Requests / min</div><div class="value" id="api_requests">–</div></div>
  <div class="card"><div class="label">Uptime</div><div class="value" id="uptime">–</div></div>
  <div class="card"><div class="label">Service</div><div class="value" id="service" style="font-size:16px">–</div></div>
</div>
<div id="error"></div>

<div class="charts">
  <div class="card"><div class="label">CPU %</div><canvas id="chart_cpu"></canvas></div>
  <div class="card"><div class="label">RAM %</div><canvas id="chart_ram"></canvas></div>
  <div class="card"><div class="label">Disk %</div><canvas id="chart_disk"></canvas></div>
</div>

<table>
  <thead><tr><th>Time (UTC)</th><th>CPU %</th><th>RAM %</th><th>Disk %</th><th>Err %</th><th>Requests</th><th>Users</th></tr></thead>
  <tbody id="rows"></tbody>
</table>

<script>
const REFRESH_MS = __REFRESH_SECS__ * 1000;
const TABLE_ROWS = __TABLE_ROWS__;

function set(id, text) { document.getElementById(id).textContent = text; }
function pct(v) { return Number(v).toFixed(2) + "%"; }

function uptime(secs) {
  const m = Math.floor(secs / 60), h = Math.floor(m / 60), d = Math.floor(h / 24);
  if (d > 0) return d + "d " + (h % 24) + "h";
  if (h > 0) return h + "h " + (m % 60) + "m";
  if (m > 0) return m + "m";
  return Math.floor(secs) + "s";
}

function chart(id, values, color) {
  const canvas = document.getElementById(id);
  const w = canvas.width = canvas.clientWidth * devicePixelRatio;
  const h = canvas.height = canvas.clientHeight * devicePixelRatio;
  const ctx = canvas.getContext("2d");
  ctx.clearRect(0, 0, w, h);
  if (values.length < 2) return;
  ctx.strokeStyle = color;
  ctx.lineWidth = 2 * devicePixelRatio;
  ctx.beginPath();
  values.forEach((v, i) => {
    const x = (i / (values.length - 1)) * w;
    const y = h - (Math.min(Math.max(v, 0), 100) / 100) * h;
    if (i === 0) ctx.moveTo(x, y); else ctx.lineTo(x, y);
  });
  ctx.stroke();
}

function render(report) {
  const health = document.getElementById("health");
  health.textContent = Number(report.health_score).toFixed(2);
  health.className = "value " + report.status;
  set("message", report.status_message);
  set("cpu", pct(report.resources.cpu));
  set("ram", pct(report.resources.ram));
  set("disk", pct(report.resources.disk));
  set("error_rate", pct(report.resources.error_rate));
  set("api_requests", report.resources.api_requests);
  set("uptime", uptime(report.uptime_seconds));
  set("service", report.deployment.service + " @ " + report.deployment.revision);
  set("stamp", report.timestamp_local + " · report " + report.report_id);

  const history = report.history_snapshot;
  chart("chart_cpu", history.map(s => s.cpu_percent), "#89b4fa");
  chart("chart_ram", history.map(s => s.ram_percent), "#a6e3a1");
  chart("chart_disk", history.map(s => s.disk_percent), "#fab387");

  const rows = document.getElementById("rows");
  rows.replaceChildren(...history.slice(-TABLE_ROWS).reverse().map(s => {
    const tr = document.createElement("tr");
    [s.timestamp.replace("T", " ").slice(0, 19), pct(s.cpu_percent), pct(s.ram_percent),
     pct(s.disk_percent), pct(s.error_rate_percent), s.api_requests, s.simulated_users]
      .forEach(v => { const td = document.createElement("td"); td.textContent = v; tr.appendChild(td); });
    return tr;
  }));
}

async function poll() {
  try {
    const res = await fetch("/analyze", { cache: "no-store" });
    const body = await res.json();
    if (!res.ok) throw new Error(body.error || res.statusText);
    render(body);
    set("error", "");
  } catch (e) {
    set("error", "update failed: " + e.message);
  }
}

poll();
setInterval(poll, REFRESH_MS);
</script>
</body>
</html>
"##;

/// Render the dashboard page, polling every `refresh_secs` seconds.
pub fn render_dashboard(refresh_secs: u64) -> String {
    TEMPLATE
        .replace("__REFRESH_SECS__", &refresh_secs.max(1).to_string())
        .replace("__TABLE_ROWS__", &TABLE_ROWS.to_string())
}
