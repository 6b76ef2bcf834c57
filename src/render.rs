use crate::db::RecentReading;

/// Plain `<ul>` rendering of the windowed listing (the `details` view).
pub fn list_page(readings: &[RecentReading]) -> String {
    let items: String = readings
        .iter()
        .map(|r| {
            format!(
                "<li>ID: {}, Temperature: {}, Humidity: {}, Device: {}, Timestamp: {}</li>\n",
                r.id, r.temperature, r.humidity, r.device, r.timestamp
            )
        })
        .collect();
    format!("<h1>Weather Data</h1>\n<p>Temperature and Humidity data:</p>\n<ul>\n{items}</ul>\n")
}

/// Google Charts line chart of temperature over time, with client-side
/// start/end date filtering. The data rows are inlined into the page.
pub fn chart_page(readings: &[RecentReading]) -> String {
    let rows: String = readings
        .iter()
        .map(|r| format!("        [new Date('{}'), {}],\n", r.timestamp, r.temperature))
        .collect();
    CHART_TEMPLATE.replace("/*ROWS*/", &rows)
}

const CHART_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<script src="https://www.gstatic.com/charts/loader.js"></script>
<body>
<div style="max-width:800px; margin: 20px auto;">
    <div style="margin-bottom: 20px;">
        <label for="startDate">Start Date: </label>
        <input type="datetime-local" id="startDate" style="margin-right: 20px;">

        <label for="endDate">End Date: </label>
        <input type="datetime-local" id="endDate" style="margin-right: 20px;">

        <button onclick="updateChart()" style="padding: 5px 15px;">Update Chart</button>
        <button onclick="resetChart()" style="padding: 5px 15px;">Reset</button>
    </div>

    <div id="myChart" style="width:100%; height:500px;"></div>
</div>

<script>
google.charts.load('current',{packages:['corechart']});
google.charts.setOnLoadCallback(initChart);

let fullData;
let chart;

function initChart() {
    fullData = new google.visualization.DataTable();
    fullData.addColumn('datetime', 'Time');
    fullData.addColumn('number', 'Temperature');
    fullData.addRows([
/*ROWS*/
    ]);

    setDefaultDateRange();

    chart = new google.visualization.LineChart(document.getElementById('myChart'));
    drawChart(fullData);
}

function setDefaultDateRange() {
    if (fullData.getNumberOfRows() === 0) return;

    let minDate = fullData.getValue(0, 0);
    let maxDate = fullData.getValue(0, 0);

    for (let i = 1; i < fullData.getNumberOfRows(); i++) {
        let date = fullData.getValue(i, 0);
        if (date < minDate) minDate = date;
        if (date > maxDate) maxDate = date;
    }

    document.getElementById('startDate').value = formatDateTimeLocal(minDate);
    document.getElementById('endDate').value = formatDateTimeLocal(maxDate);
}

function formatDateTimeLocal(date) {
    const year = date.getFullYear();
    const month = String(date.getMonth() + 1).padStart(2, '0');
    const day = String(date.getDate()).padStart(2, '0');
    const hours = String(date.getHours()).padStart(2, '0');
    const minutes = String(date.getMinutes()).padStart(2, '0');
    return `${year}-${month}-${day}T${hours}:${minutes}`;
}

function updateChart() {
    const startDateInput = document.getElementById('startDate').value;
    const endDateInput = document.getElementById('endDate').value;

    if (!startDateInput || !endDateInput) {
        alert('Please select both start and end dates');
        return;
    }

    const startDate = new Date(startDateInput);
    const endDate = new Date(endDateInput);

    if (startDate > endDate) {
        alert('Start date must be before end date');
        return;
    }

    const filteredData = new google.visualization.DataTable();
    filteredData.addColumn('datetime', 'Time');
    filteredData.addColumn('number', 'Temperature');

    for (let i = 0; i < fullData.getNumberOfRows(); i++) {
        const date = fullData.getValue(i, 0);
        const temp = fullData.getValue(i, 1);

        if (date >= startDate && date <= endDate) {
            filteredData.addRow([date, temp]);
        }
    }

    if (filteredData.getNumberOfRows() === 0) {
        alert('No data found in selected date range');
        return;
    }

    drawChart(filteredData);
}

function resetChart() {
    setDefaultDateRange();
    drawChart(fullData);
}

function drawChart(data) {
    const options = {
        title: 'Temperature vs Time',
        hAxis: {title: 'Time'},
        vAxis: {title: 'Temperature'},
        legend: 'none',
        chartArea: {width: '80%', height: '70%'}
    };

    chart.draw(data, options);
}
</script>

</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<RecentReading> {
        vec![RecentReading {
            id: 7,
            temperature: 21.5,
            humidity: 48.0,
            device: "Office".to_owned(),
            timestamp: "2026-08-26T10:15:00.000000".to_owned(),
        }]
    }

    #[test]
    fn list_page_contains_reading_fields() {
        let html = list_page(&sample());
        assert!(html.contains("ID: 7"));
        assert!(html.contains("Temperature: 21.5"));
        assert!(html.contains("Device: Office"));
    }

    #[test]
    fn chart_page_inlines_data_rows() {
        let html = chart_page(&sample());
        assert!(html.contains("google.charts.load"));
        assert!(html.contains("[new Date('2026-08-26T10:15:00.000000'), 21.5],"));
        assert!(!html.contains("/*ROWS*/"));
    }

    #[test]
    fn chart_page_with_no_readings_has_empty_rows() {
        let html = chart_page(&[]);
        assert!(html.contains("addRows([\n\n    ]);"));
    }
}
