pub fn render_index(alerts: &[String]) -> String {
    let alerts_html: String = alerts
        .iter()
        .map(|alert| format!("<li>{}</li>", escape_html(alert)))
        .collect();
    let alerts_json = serde_json::to_string(alerts).unwrap_or_else(|_| "[]".to_string());
    INDEX_HTML
        .replace("{{ALERTS}}", &alerts_html)
        .replace("{{ALERTS_JSON}}", &alerts_json.replace("</", "<\\/"))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Activities Map</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/nouislider@15.7.1/dist/nouislider.min.css" />
  <style>
    html, body {
      margin: 0;
      height: 100%;
      font-family: "Trebuchet MS", sans-serif;
    }

    #map {
      position: absolute;
      inset: 0;
    }

    .date-filter {
      position: absolute;
      z-index: 1000;
      left: 50%;
      bottom: 24px;
      transform: translateX(-50%);
      width: min(520px, 90%);
      background: rgba(255, 255, 255, 0.92);
      border-radius: 12px;
      box-shadow: 0 8px 24px rgba(0, 0, 0, 0.2);
      padding: 14px 22px 18px;
    }

    .date-filter[hidden] {
      display: none;
    }

    #date-range {
      text-align: center;
      margin-bottom: 12px;
      font-weight: 600;
    }

    .alerts {
      position: absolute;
      z-index: 1000;
      top: 12px;
      right: 12px;
      margin: 0;
      padding: 10px 16px 10px 32px;
      background: #fff4e5;
      color: #8a4b00;
      border-radius: 8px;
    }

    .alerts:empty {
      display: none;
    }
  </style>
</head>
<body>
  <div id="map"></div>
  <ul class="alerts">{{ALERTS}}</ul>
  <div class="date-filter" id="date-filter" hidden>
    <div id="date-range"></div>
    <div id="date-slider"></div>
  </div>

  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="https://cdn.jsdelivr.net/npm/nouislider@15.7.1/dist/nouislider.min.js"></script>
  <script>
    const alerts = {{ALERTS_JSON}};
    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        throw new Error(await res.text());
      }
      return res.json();
    };

    let leafletMap = null;
    let activityLayer = null;

    const drawLayers = async () => {
      const res = await fetch('/api/layers');
      const scene = await res.json();

      if (!leafletMap) {
        leafletMap = L.map('map').setView(scene.center, scene.zoom);
        const baseLayers = {};
        scene.tiles.forEach((tile) => {
          const layer = L.tileLayer(tile.url, { attribution: tile.attribution || '' });
          baseLayers[tile.name] = layer;
          if (tile.active) {
            layer.addTo(leafletMap);
          }
        });
        const overlays = {};
        scene.overlays.forEach((overlay) => {
          overlays[overlay.name] = L.layerGroup();
          if (overlay.active) {
            overlays[overlay.name].addTo(leafletMap);
          }
        });
        L.control.layers(baseLayers, overlays, { collapsed: true, position: 'topleft' }).addTo(leafletMap);
        leafletMap.on('overlayadd', (event) => toggleOverlay(event.name, true));
        leafletMap.on('overlayremove', (event) => toggleOverlay(event.name, false));
      }

      if (activityLayer) {
        activityLayer.remove();
      }
      activityLayer = L.layerGroup(scene.layers.map((layer) => {
        const line = L.polyline(layer.coordinates, { color: layer.color, weight: 3, opacity: 0.8 })
          .bindPopup(layer.popup || '', { maxWidth: layer.popup_max_width || 300 });
        if (layer.highlight) {
          line.on('mouseover', () => line.setStyle({ color: 'lime' }));
          line.on('mouseout', () => {
            if (!line.isPopupOpen()) {
              line.setStyle({ color: layer.color });
            }
          });
          line.on('popupclose', () => line.setStyle({ color: layer.color }));
        }
        return line;
      })).addTo(leafletMap);
    };

    const toggleOverlay = (name, active) => {
      post('/api/overlays/' + encodeURIComponent(name), { active })
        .then(drawLayers)
        .catch((err) => console.log(err.message));
    };

    const initSlider = async () => {
      const res = await fetch('/api/slider');
      const config = await res.json();
      if (!config) {
        console.log('No dates found.');
        return;
      }

      const panel = document.getElementById('date-filter');
      const dateSlider = document.getElementById('date-slider');
      const dateRange = document.getElementById('date-range');
      panel.hidden = false;

      noUiSlider.create(dateSlider, {
        start: config.start,
        connect: config.connect,
        range: config.range,
        step: 24 * 60 * 60 * 1000,
        tooltips: false,
        format: {
          to: (value) => new Date(value).toISOString().split('T')[0],
          from: (value) => Number(value) || new Date(value).getTime()
        }
      });

      dateSlider.noUiSlider.on('update', (values) => {
        post('/api/range/update', { values })
          .then((res) => { dateRange.textContent = res.label; })
          .catch((err) => console.log(err.message));
      });
      dateSlider.noUiSlider.on('set', (values) => {
        post('/api/range/set', { values })
          .then(drawLayers)
          .catch((err) => console.log(err.message));
      });
    };

    alerts.forEach((message) => alert(message));
    drawLayers().then(initSlider).catch((err) => console.log(err.message));
  </script>
</body>
</html>
"#;
